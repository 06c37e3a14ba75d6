//! # Applier Module
//!
//! Activates installed themes in the live environment.
//!
//! The [`Applier`] always re-verifies installed state before touching the
//! environment and is idempotent: applying the theme that is already active
//! returns [`Applied`] with `already_active` set and has no further effect.
//!
//! How a theme is activated depends on the environment, so the actual work is
//! delegated to an [`ApplyBackend`]:
//!
//! - [`StateFileBackend`] - records the active theme in a state file
//! - [`CommandBackend`] - runs a configured program such as `gsettings`

pub use self::backend::{ApplyBackend, BackendError};
pub use self::command::CommandBackend;
pub use self::state_file::{ActiveThemeRecord, StateFileBackend};

/// Backend trait and its error type
pub mod backend;
/// External command backend
pub mod command;
/// State file backend
pub mod state_file;

use crate::common::ApplyError;
use crate::validation::ThemeName;
use crate::verifier::InstalledStateVerifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Successful apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applied {
    pub theme: String,
    pub already_active: bool,
}

pub struct Applier {
    verifier: InstalledStateVerifier,
    backend: Arc<dyn ApplyBackend>,
}

impl Applier {
    pub fn new(verifier: InstalledStateVerifier, backend: Arc<dyn ApplyBackend>) -> Self {
        Self { verifier, backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn apply(&self, theme_name: &str) -> Result<Applied, ApplyError> {
        let name = ThemeName::parse(theme_name)?;

        if !self.verifier.check_name(&name).await.is_installed() {
            return Err(ApplyError::NotInstalled {
                theme: name.into_inner(),
            });
        }

        match self.backend.active_theme().await {
            Ok(Some(active)) if active == name.as_str() => {
                log::info!("Theme '{name}' is already active");
                return Ok(Applied {
                    theme: name.into_inner(),
                    already_active: true,
                });
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!(
                    "Could not query active theme from {}: {}",
                    self.backend.name(),
                    e
                );
            }
        }

        let theme_dir = self.verifier.root().theme_dir(&name);
        self.backend
            .activate(&name, &theme_dir)
            .await
            .map_err(|e| ApplyError::Backend {
                theme: name.to_string(),
                backend: self.backend.name().to_string(),
                reason: e.reason,
            })?;

        log::info!("Applied theme '{name}' with {}", self.backend.name());
        Ok(Applied {
            theme: name.into_inner(),
            already_active: false,
        })
    }

    /// Name of the active theme, if the backend can tell.
    pub async fn active_theme(&self) -> Result<Option<String>, BackendError> {
        self.backend.active_theme().await
    }
}

impl std::fmt::Debug for Applier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("root", self.verifier.root())
            .field("backend", &self.backend.name())
            .finish()
    }
}
