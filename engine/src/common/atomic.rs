use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Writes `data` to `path` through a sibling temp file and a rename.
///
/// Readers observe either the previous content or the new content, never a
/// partial write. The parent directory is created if needed.
pub async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(format!(".tmp-{}", uuid::Uuid::new_v4()));
    let temp_path = path.with_file_name(temp_name);

    let result = async {
        let mut file = File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&temp_path).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        write_atomic(&path, b"one").await.unwrap();
        write_atomic(&path, b"two").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"two");
        let mut entries = tokio::fs::read_dir(dir.path().join("nested")).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
