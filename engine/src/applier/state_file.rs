use super::backend::{ApplyBackend, BackendError};
use crate::common::write_atomic;
use crate::validation::ThemeName;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ACTIVE_THEME_FILE: &str = "active-theme.json";

/// Content of `active-theme.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveThemeRecord {
    pub theme: String,
    pub path: PathBuf,
    pub applied_at: DateTime<Utc>,
}

/// Records the active theme in a JSON file in the state directory.
///
/// This is the default backend. Desktop integrations can read the file, or
/// the user can switch to [`CommandBackend`](super::CommandBackend).
#[derive(Debug, Clone)]
pub struct StateFileBackend {
    state_file: PathBuf,
    backup: bool,
}

impl StateFileBackend {
    pub fn new(state_dir: impl AsRef<Path>, backup: bool) -> Self {
        Self {
            state_file: state_dir.as_ref().join(ACTIVE_THEME_FILE),
            backup,
        }
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    fn backup_file(&self) -> PathBuf {
        let mut name = self.state_file.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub async fn read_record(&self) -> Result<Option<ActiveThemeRecord>, BackendError> {
        let bytes = match tokio::fs::read(&self.state_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BackendError::new(format!(
                    "Failed to read {}: {e}",
                    self.state_file.display()
                )));
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            BackendError::new(format!(
                "Invalid state file {}: {e}",
                self.state_file.display()
            ))
        })
    }
}

#[async_trait]
impl ApplyBackend for StateFileBackend {
    fn name(&self) -> &str {
        "state file"
    }

    async fn active_theme(&self) -> Result<Option<String>, BackendError> {
        Ok(self.read_record().await?.map(|record| record.theme))
    }

    async fn activate(&self, theme: &ThemeName, theme_dir: &Path) -> Result<(), BackendError> {
        if self.backup && tokio::fs::try_exists(&self.state_file).await.unwrap_or(false) {
            let backup = self.backup_file();
            tokio::fs::copy(&self.state_file, &backup)
                .await
                .map_err(|e| BackendError::new(format!("Failed to back up state file: {e}")))?;
            log::debug!("Backed up previous state to {}", backup.display());
        }

        let record = ActiveThemeRecord {
            theme: theme.to_string(),
            path: theme_dir.to_path_buf(),
            applied_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| BackendError::new(format!("Failed to serialize state: {e}")))?;

        write_atomic(&self.state_file, &json).await.map_err(|e| {
            BackendError::new(format!(
                "Failed to write {}: {e}",
                self.state_file.display()
            ))
        })
    }
}
