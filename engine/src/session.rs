//! Persisted sign-in session.
//!
//! The session secret is stored in `session.json` in the config directory,
//! readable by the owner only on Unix.

use crate::catalog::StoredSession;
use crate::common::write_atomic;
use std::path::{Path, PathBuf};

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            path: config_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session. A missing or unreadable file means signed out.
    pub async fn load(&self) -> Option<StoredSession> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(stored) => Some(stored),
            Err(e) => {
                log::warn!("Ignoring invalid session file {}: {e}", self.path.display());
                None
            }
        }
    }

    pub async fn save(&self, stored: &StoredSession) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(stored).map_err(std::io::Error::other)?;
        write_atomic(&self.path, &json).await?;
        restrict_permissions(&self.path).await?;
        log::debug!("Saved session for {}", stored.identity.email);
        Ok(())
    }

    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
