use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-name async locks.
///
/// Installs of the same name are serialized; different names proceed in
/// parallel. Entries are held weakly and pruned once no install holds them.
#[derive(Debug, Default)]
pub struct NameLocks {
    locks: StdMutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, weak| weak.strong_count() > 0);

            match locks.get(name).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(name.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of names with a live lock.
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.values().filter(|weak| weak.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_name_is_exclusive() {
        let locks = Arc::new(NameLocks::new());
        let guard = locks.acquire("Cool").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("Cool").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(5), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let locks = NameLocks::new();
        let _a = locks.acquire("A").await;

        tokio::time::timeout(Duration::from_secs(5), locks.acquire("B"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_entries_are_pruned() {
        let locks = NameLocks::new();
        {
            let _a = locks.acquire("A").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
