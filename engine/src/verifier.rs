//! Installed-state verification.
//!
//! The verifier answers one question: is a theme with this name installed
//! under the install root right now? It reads `<root>/<name>/reskin.json`
//! and never caches, never locks and never writes, so it is safe to call from
//! any number of tasks, including while an install of the same name is in
//! progress (it then observes either the old or the new record).

use crate::common::{MAX_MANIFEST_SIZE, PathSafetyError};
use crate::install_root::InstallRoot;
use crate::manifest::ThemeManifest;
use crate::validation::ThemeName;
use tokio::io::AsyncReadExt;

/// Answer of [`InstalledStateVerifier::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Installed(ThemeManifest),
    NotInstalled,
}

impl InstallState {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallState::Installed(_))
    }

    pub fn manifest(&self) -> Option<&ThemeManifest> {
        match self {
            InstallState::Installed(manifest) => Some(manifest),
            InstallState::NotInstalled => None,
        }
    }
}

/// Detailed answer of [`InstalledStateVerifier::inspect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    Installed(ThemeManifest),
    /// No theme directory or no manifest file.
    Absent,
    /// A record exists but cannot be trusted.
    Corrupt { reason: String },
}

impl From<Inspection> for InstallState {
    fn from(inspection: Inspection) -> Self {
        match inspection {
            Inspection::Installed(manifest) => InstallState::Installed(manifest),
            Inspection::Absent | Inspection::Corrupt { .. } => InstallState::NotInstalled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstalledStateVerifier {
    root: InstallRoot,
}

impl InstalledStateVerifier {
    pub fn new(root: InstallRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &InstallRoot {
        &self.root
    }

    /// Installed or not. A corrupt record counts as not installed.
    pub async fn check(&self, theme_name: &str) -> Result<InstallState, PathSafetyError> {
        let name = ThemeName::parse(theme_name)?;
        Ok(self.check_name(&name).await)
    }

    pub async fn check_name(&self, name: &ThemeName) -> InstallState {
        match self.inspect_name(name).await {
            Inspection::Corrupt { reason } => {
                log::warn!("Theme '{name}' has a corrupt install record: {reason}");
                InstallState::NotInstalled
            }
            Inspection::Absent => {
                log::debug!("Theme '{name}' is not installed");
                InstallState::NotInstalled
            }
            installed => installed.into(),
        }
    }

    /// Like [`check`](Self::check) but keeps absence and corruption apart.
    pub async fn inspect(&self, theme_name: &str) -> Result<Inspection, PathSafetyError> {
        let name = ThemeName::parse(theme_name)?;
        Ok(self.inspect_name(&name).await)
    }

    pub async fn inspect_name(&self, name: &ThemeName) -> Inspection {
        let theme_dir = self.root.theme_dir(name);
        match tokio::fs::metadata(&theme_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Inspection::Corrupt {
                    reason: format!("'{}' is not a directory", theme_dir.display()),
                };
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Inspection::Absent,
            Err(e) => {
                return Inspection::Corrupt {
                    reason: format!("cannot access '{}': {e}", theme_dir.display()),
                };
            }
        }

        let manifest_path = self.root.manifest_path(name);
        let bytes = match read_bounded(&manifest_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Inspection::Absent,
            Err(e) => {
                return Inspection::Corrupt {
                    reason: format!("cannot read '{}': {e}", manifest_path.display()),
                };
            }
        };

        match ThemeManifest::from_json_slice(&bytes) {
            Ok(manifest) if manifest.name == name.as_str() => Inspection::Installed(manifest),
            Ok(manifest) => Inspection::Corrupt {
                reason: format!(
                    "manifest names theme '{}' but directory is '{name}'",
                    manifest.name
                ),
            },
            Err(e) => Inspection::Corrupt {
                reason: e.to_string(),
            },
        }
    }
}

/// Reads at most [`MAX_MANIFEST_SIZE`] bytes, failing on anything larger.
async fn read_bounded(path: &std::path::Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(MAX_MANIFEST_SIZE as u64 + 1)
        .read_to_end(&mut bytes)
        .await?;
    if bytes.len() > MAX_MANIFEST_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "manifest file is too large",
        ));
    }
    Ok(bytes)
}
