use crate::validation::ThemeName;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Failure reported by an [`ApplyBackend`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct BackendError {
    pub reason: String,
}

impl BackendError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Environment-specific theme activation.
///
/// Implementations must be safe to share between tasks. The applier has
/// already verified that `theme_dir` holds a valid installation when
/// [`activate`](Self::activate) is called.
#[async_trait]
pub trait ApplyBackend: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// The currently active theme, or `None` when unknown.
    async fn active_theme(&self) -> Result<Option<String>, BackendError>;

    async fn activate(&self, theme: &ThemeName, theme_dir: &Path) -> Result<(), BackendError>;
}

impl std::fmt::Debug for dyn ApplyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplyBackend").field("name", &self.name()).finish()
    }
}
