use super::format::{write_entry, write_header};
use crate::common::{DecodeError, MANIFEST_FILE_NAME, ThemeError, ThemeResult};
use crate::manifest::ThemeManifest;
use crate::validation::{EntryPathValidator, Validator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Builds `.reskin` packages from a manifest and a set of assets.
///
/// Assets are keyed by their package path and written in sorted order, so the
/// same inputs always produce the same bytes.
///
/// # Examples
///
/// ```no_run
/// use engine::package::PackageBuilder;
/// # async fn demo(manifest: engine::ThemeManifest) -> Result<(), Box<dyn std::error::Error>> {
///
/// let bytes = PackageBuilder::from_directory(manifest, "./my-theme")
///     .await?
///     .build()?;
/// tokio::fs::write("my-theme.reskin", bytes).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    manifest: ThemeManifest,
    assets: BTreeMap<String, Vec<u8>>,
}

impl PackageBuilder {
    pub fn new(manifest: ThemeManifest) -> Self {
        Self {
            manifest,
            assets: BTreeMap::new(),
        }
    }

    /// Adds an asset under a relative package path, replacing any previous one.
    pub fn add_asset(
        &mut self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<&mut Self, DecodeError> {
        let path = path.into();
        EntryPathValidator.validate(&path)?;
        self.assets.insert(path, data.into());
        Ok(self)
    }

    /// Collects every regular file under `dir`.
    ///
    /// Hidden files and directories are skipped, as are symlinks and a
    /// top-level `reskin.json`; the manifest is always written from
    /// `manifest`.
    pub async fn from_directory(
        manifest: ThemeManifest,
        dir: impl AsRef<Path>,
    ) -> ThemeResult<Self> {
        let root = dir.as_ref();
        let metadata = tokio::fs::metadata(root).await.map_err(|e| {
            ThemeError::Io(format!(
                "Theme directory '{}' is not accessible: {e}",
                root.display()
            ))
        })?;
        if !metadata.is_dir() {
            return Err(ThemeError::Io(format!(
                "Theme directory '{}' is not a directory",
                root.display()
            )));
        }

        let mut builder = Self::new(manifest);
        for relative in collect_files(root).await? {
            let data = tokio::fs::read(root.join(&relative)).await.map_err(|e| {
                ThemeError::Io(format!(
                    "Failed to read asset {}: {e}",
                    relative.display()
                ))
            })?;
            builder.add_asset(package_path(&relative), data)?;
        }

        if builder.assets.is_empty() {
            log::warn!("No files found in theme directory {}", root.display());
        } else {
            log::info!(
                "Collected {} asset(s) from {}",
                builder.assets.len(),
                root.display()
            );
        }

        Ok(builder)
    }

    pub fn manifest(&self) -> &ThemeManifest {
        &self.manifest
    }

    pub fn asset_paths(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Encodes the package.
    pub fn build(&self) -> ThemeResult<Vec<u8>> {
        let manifest_json = self
            .manifest
            .to_json_compact()
            .map_err(|e| ThemeError::Internal(format!("Failed to serialize manifest: {e}")))?;

        let mut out = Vec::new();
        write_header(&mut out, &manifest_json);
        for (path, data) in &self.assets {
            write_entry(&mut out, path, data);
        }
        Ok(out)
    }
}

/// Package paths always use `/`, whatever the host separator.
fn package_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

async fn collect_files(root: &Path) -> ThemeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative_dir) = pending.pop() {
        let dir = root.join(&relative_dir);
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
            ThemeError::Io(format!("Failed to read directory {}: {e}", dir.display()))
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ThemeError::Io(format!("Failed to read entry: {e}")))?
        {
            let name = entry.file_name();
            if is_hidden(&name) {
                continue;
            }
            let relative = relative_dir.join(&name);
            if relative_dir.as_os_str().is_empty() && name == MANIFEST_FILE_NAME {
                continue;
            }

            let file_type = entry.file_type().await.map_err(|e| {
                ThemeError::Io(format!("Failed to stat {}: {e}", relative.display()))
            })?;
            if file_type.is_dir() {
                pending.push(relative);
            } else if file_type.is_file() {
                files.push(relative);
            } else {
                log::debug!("Skipping non-regular file {}", relative.display());
            }
        }
    }

    Ok(files)
}
