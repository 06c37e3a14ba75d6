//! Recently installed themes.
//!
//! Kept as pretty JSON in `recent.json` in the state directory: at most
//! [`MAX_RECENT_THEMES`] entries, newest first, one entry per theme name.

use crate::common::write_atomic;
use crate::manifest::ThemeManifest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub const MAX_RECENT_THEMES: usize = 4;
pub const RECENT_FILE: &str = "recent.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTheme {
    pub name: String,
    pub author: String,
    pub description: String,
    /// Unix seconds
    pub installed_at: u64,
}

#[derive(Debug)]
pub struct RecentThemes {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RecentThemes {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(RECENT_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recent list. A missing or unreadable file is an empty list.
    pub async fn list(&self) -> Vec<RecentTheme> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        serde_json::from_slice(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid {}: {e}", self.path.display());
            Vec::new()
        })
    }

    /// Moves `manifest` to the front of the list.
    pub async fn record(&self, manifest: &ThemeManifest) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;

        let installed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut themes = self.list().await;
        themes.retain(|t| t.name != manifest.name);
        themes.insert(
            0,
            RecentTheme {
                name: manifest.name.clone(),
                author: manifest.author.clone(),
                description: manifest.description.clone(),
                installed_at,
            },
        );
        themes.truncate(MAX_RECENT_THEMES);

        let json = serde_json::to_vec_pretty(&themes).map_err(std::io::Error::other)?;
        write_atomic(&self.path, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(name: &str) -> ThemeManifest {
        ThemeManifest::from_json_slice(
            format!(r#"{{"name":"{name}","author":"a","version":"1","license":"MIT"}}"#)
                .as_bytes(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_newest_first_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let recent = RecentThemes::new(dir.path());

        for name in ["A", "B", "C", "D", "E"] {
            recent.record(&manifest(name)).await.unwrap();
        }

        let names: Vec<_> = recent.list().await.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["E", "D", "C", "B"]);
    }

    #[tokio::test]
    async fn test_reinstall_moves_to_front() {
        let dir = tempfile::tempdir().unwrap();
        let recent = RecentThemes::new(dir.path());

        recent.record(&manifest("A")).await.unwrap();
        recent.record(&manifest("B")).await.unwrap();
        recent.record(&manifest("A")).await.unwrap();

        let names: Vec<_> = recent.list().await.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_invalid_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(RECENT_FILE), "garbage").await.unwrap();

        assert!(RecentThemes::new(dir.path()).list().await.is_empty());
    }
}
