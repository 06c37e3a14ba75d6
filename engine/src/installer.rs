//! # Installer Module
//!
//! Atomic installation of package bytes under a theme name.
//!
//! ## Algorithm
//!
//! 1. Validate the theme name (no filesystem access before this)
//! 2. Re-validate the package and require `manifest.name == theme_name`
//! 3. Acquire the per-name lock
//! 4. Stage every asset and the manifest into `<root>/.reskin-staging-<uuid>`
//! 5. Commit: on unix, rename staging to `<root>/.reskin-store-<uuid>` and
//!    rename a fresh link to it over `<root>/<name>`, then drop the previous
//!    store. Elsewhere, move any existing `<root>/<name>` aside and rename
//!    staging into place, restoring the previous directory on failure
//! 6. Optionally apply the theme
//!
//! A failure in steps 1-5 leaves the install root as it was. A failure in
//! step 6 is reported in [`InstallReport::apply`] and does not undo the
//! install.
//!
//! ## Usage
//!
//! ```no_run
//! use engine::installer::{ApplyOutcome, Installer};
//! # async fn demo(installer: &Installer, bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//!
//! let report = installer.install(&bytes, "Cool", true).await?;
//! println!("Installed to {}", report.location.display());
//! if let ApplyOutcome::Failed(e) = &report.apply {
//!     eprintln!("Installed, but could not apply: {e}");
//! }
//! # Ok(())
//! # }
//! ```

pub use self::locks::NameLocks;

/// Per-name install serialization
pub mod locks;
/// Staging directory population
pub mod staging;

use crate::applier::{Applied, Applier};
use crate::common::{ApplyError, DecodeError, InstallError, MANIFEST_FILE_NAME};
use crate::install_root::{InstallRoot, LINK_PREFIX, STAGING_PREFIX, STORE_PREFIX, TRASH_PREFIX};
use crate::manifest::ThemeManifest;
use crate::package::PackageDecoder;
use crate::validation::ThemeName;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What happened to the optional apply step of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    NotRequested,
    Applied(Applied),
    Failed(ApplyError),
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub manifest: ThemeManifest,
    pub location: PathBuf,
    /// SHA-256 of the package bytes, lowercase hex.
    pub digest: String,
    pub apply: ApplyOutcome,
}

/// Leftovers handled by [`Installer::recover`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub removed: Vec<PathBuf>,
    pub restored: Vec<PathBuf>,
}

pub struct Installer {
    root: InstallRoot,
    decoder: PackageDecoder,
    locks: NameLocks,
    applier: Arc<Applier>,
}

impl Installer {
    pub fn new(root: InstallRoot, decoder: PackageDecoder, applier: Arc<Applier>) -> Self {
        Self {
            root,
            decoder,
            locks: NameLocks::new(),
            applier,
        }
    }

    pub fn root(&self) -> &InstallRoot {
        &self.root
    }

    pub async fn install(
        &self,
        bytes: &[u8],
        theme_name: &str,
        auto_apply: bool,
    ) -> Result<InstallReport, InstallError> {
        let name = ThemeName::parse(theme_name)?;
        let package = self.decoder.open(bytes)?;

        if package.manifest.name != name.as_str() {
            return Err(DecodeError::NameMismatch {
                expected: name.into_inner(),
                found: package.manifest.name,
            }
            .into());
        }

        let _guard = self.locks.acquire(name.as_str()).await;
        log::info!(
            "Installing theme '{name}' ({} asset(s), {} bytes)",
            package.entries.len(),
            bytes.len()
        );

        self.root
            .ensure_exists()
            .await
            .map_err(|e| InstallError::io("create install root", self.root.path(), e))?;

        let staging_dir = self.root.new_staging_dir();
        if let Err(e) = staging::stage(&staging_dir, &package).await {
            log::error!("Staging theme '{name}' failed: {e}");
            staging::discard(&staging_dir).await;
            return Err(e);
        }

        let location = self.root.theme_dir(&name);
        self.commit(&staging_dir, &location).await?;
        log::info!("Installed theme '{name}' to {}", location.display());

        let apply = if auto_apply {
            match self.applier.apply(name.as_str()).await {
                Ok(applied) => ApplyOutcome::Applied(applied),
                Err(e) => {
                    log::warn!("Theme '{name}' installed but not applied: {e}");
                    ApplyOutcome::Failed(e)
                }
            }
        } else {
            ApplyOutcome::NotRequested
        };

        Ok(InstallReport {
            manifest: package.manifest,
            location,
            digest: format!("{:x}", Sha256::digest(bytes)),
            apply,
        })
    }

    /// Publishes the staged directory as `location`.
    ///
    /// The staging directory becomes a store and a fresh link to it is
    /// renamed over `location`, so a reinstall is a single rename. A plain
    /// directory at `location` is converted through the trash once.
    #[cfg(unix)]
    async fn commit(&self, staging_dir: &Path, location: &Path) -> Result<(), InstallError> {
        let store_name = InstallRoot::new_store_name();
        let store_dir = self.root.path().join(&store_name);
        if let Err(e) = tokio::fs::rename(staging_dir, &store_dir).await {
            staging::discard(staging_dir).await;
            return Err(InstallError::io("seal staged theme", staging_dir, e));
        }

        let link = self.root.new_link_path();
        if let Err(e) = tokio::fs::symlink(&store_name, &link).await {
            staging::discard(&store_dir).await;
            return Err(InstallError::io("link staged theme", &link, e));
        }

        let published = match tokio::fs::symlink_metadata(location).await {
            Ok(meta) if !meta.file_type().is_symlink() => {
                log::info!("Converting {} to a linked install", location.display());
                self.swap_through_trash(&link, location).await.map(|()| None)
            }
            Ok(_) => {
                let previous = self.owned_store(location).await;
                tokio::fs::rename(&link, location)
                    .await
                    .map(|()| previous)
                    .map_err(|e| InstallError::io("move staged theme into", location, e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::rename(&link, location)
                    .await
                    .map(|()| None)
                    .map_err(|e| InstallError::io("move staged theme into", location, e))
            }
            Err(e) => Err(InstallError::io("inspect", location, e)),
        };

        match published {
            Ok(previous) => {
                if let Some(previous) = previous {
                    staging::discard(&previous).await;
                }
                Ok(())
            }
            Err(e) => {
                remove_link(&link).await;
                staging::discard(&store_dir).await;
                Err(e)
            }
        }
    }

    /// Moves the staged directory into place through the trash.
    #[cfg(not(unix))]
    async fn commit(&self, staging_dir: &Path, location: &Path) -> Result<(), InstallError> {
        if let Err(e) = self.swap_through_trash(staging_dir, location).await {
            staging::discard(staging_dir).await;
            return Err(e);
        }
        Ok(())
    }

    /// Renames `entry` to `location`, moving any previous entry aside first.
    ///
    /// `location` is absent between the two renames. The previous entry is
    /// restored if the second rename fails. `entry` is left for the caller.
    async fn swap_through_trash(&self, entry: &Path, location: &Path) -> Result<(), InstallError> {
        let trash_dir = match tokio::fs::symlink_metadata(location).await {
            Ok(_) => {
                let trash_dir = self.root.new_trash_dir();
                tokio::fs::rename(location, &trash_dir)
                    .await
                    .map_err(|e| InstallError::io("move previous version", location, e))?;
                Some(trash_dir)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(InstallError::io("inspect", location, e)),
        };

        if let Err(e) = tokio::fs::rename(entry, location).await {
            if let Some(trash_dir) = &trash_dir {
                if let Err(restore) = tokio::fs::rename(trash_dir, location).await {
                    log::error!(
                        "Failed to restore previous version from {}: {restore}",
                        trash_dir.display()
                    );
                }
            }
            return Err(InstallError::io("move staged theme into", location, e));
        }

        if let Some(trash_dir) = trash_dir {
            staging::discard(&trash_dir).await;
        }
        Ok(())
    }

    /// The store a theme link points at, when it is one of ours.
    ///
    /// Links the user made to directories elsewhere are never followed for
    /// deletion.
    async fn owned_store(&self, link: &Path) -> Option<PathBuf> {
        let target = tokio::fs::read_link(link).await.ok()?;
        let target = target.to_str()?;
        InstallRoot::is_store(target).then(|| self.root.path().join(target))
    }

    /// Cleans up after a process that died mid-install.
    ///
    /// Staging directories, pending links and stores no theme links to are
    /// deleted. A trash directory whose theme has no installed record is
    /// restored, otherwise it is deleted. Must not run concurrently with
    /// [`install`](Self::install).
    pub async fn recover(&self) -> Result<RecoveryReport, InstallError> {
        let mut report = RecoveryReport::default();
        let mut entries = match tokio::fs::read_dir(self.root.path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(InstallError::io("read install root", self.root.path(), e)),
        };

        let mut leftovers = Vec::new();
        let mut linked = HashSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InstallError::io("read install root", self.root.path(), e))?
        {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if InstallRoot::is_leftover(file_name) {
                leftovers.push((file_name.to_string(), entry.path()));
            } else if let Some(store) = self.owned_store(&entry.path()).await {
                linked.insert(store);
            }
        }

        for (file_name, path) in leftovers {
            if file_name.starts_with(STAGING_PREFIX) {
                staging::discard(&path).await;
                report.removed.push(path);
            } else if file_name.starts_with(LINK_PREFIX) {
                remove_link(&path).await;
                report.removed.push(path);
            } else if file_name.starts_with(STORE_PREFIX) {
                if !linked.contains(&path) {
                    staging::discard(&path).await;
                    report.removed.push(path);
                }
            } else if file_name.starts_with(TRASH_PREFIX) {
                match self.restore_target(&path).await {
                    Some(target) => {
                        log::warn!(
                            "Restoring interrupted install {} to {}",
                            path.display(),
                            target.display()
                        );
                        tokio::fs::rename(&path, &target)
                            .await
                            .map_err(|e| InstallError::io("restore", &target, e))?;
                        report.restored.push(target);
                    }
                    None => {
                        staging::discard(&path).await;
                        report.removed.push(path);
                    }
                }
            }
        }

        if !report.removed.is_empty() || !report.restored.is_empty() {
            log::info!(
                "Recovered install root: {} removed, {} restored",
                report.removed.len(),
                report.restored.len()
            );
        }
        Ok(report)
    }

    /// Where a trash directory should go back to, if its theme is missing.
    async fn restore_target(&self, trash_dir: &Path) -> Option<PathBuf> {
        let bytes = tokio::fs::read(trash_dir.join(MANIFEST_FILE_NAME)).await.ok()?;
        let manifest = ThemeManifest::from_json_slice(&bytes).ok()?;
        let name = ThemeName::parse(manifest.name).ok()?;
        let target = self.root.theme_dir(&name);
        match tokio::fs::symlink_metadata(&target).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Some(target),
            _ => None,
        }
    }
}

/// Best-effort removal of a pending link.
async fn remove_link(link: &Path) {
    match tokio::fs::remove_file(link).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {e}", link.display()),
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("root", &self.root)
            .field("decoder", &self.decoder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::StateFileBackend;
    use crate::package::PackageBuilder;
    use crate::verifier::InstalledStateVerifier;

    fn installer(root: &Path, state: &Path) -> Installer {
        let root = InstallRoot::new(root);
        let applier = Arc::new(Applier::new(
            InstalledStateVerifier::new(root.clone()),
            Arc::new(StateFileBackend::new(state, false)),
        ));
        Installer::new(root, PackageDecoder::default(), applier)
    }

    fn package(name: &str) -> Vec<u8> {
        let manifest = ThemeManifest::from_json_slice(
            format!(r#"{{"name":"{name}","author":"a","version":"1","license":"MIT"}}"#)
                .as_bytes(),
        )
        .unwrap();
        let mut builder = PackageBuilder::new(manifest);
        builder.add_asset("gtk-3.0/gtk.css", b"css".to_vec()).unwrap();
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_install_writes_record_and_digest() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());
        let bytes = package("Cool");

        let report = installer.install(&bytes, "Cool", false).await.unwrap();

        assert_eq!(report.location, root.path().join("Cool"));
        assert_eq!(report.apply, ApplyOutcome::NotRequested);
        assert_eq!(report.digest.len(), 64);
        assert!(root.path().join("Cool/reskin.json").exists());
        assert_eq!(
            tokio::fs::read(root.path().join("Cool/gtk-3.0/gtk.css")).await.unwrap(),
            b"css"
        );
    }

    #[tokio::test]
    async fn test_name_mismatch_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());

        let err = installer
            .install(&package("Cool"), "Other", false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InstallError::Decode(DecodeError::NameMismatch { .. })
        ));
        assert!(!root.path().join("Other").exists());
    }

    #[tokio::test]
    async fn test_recover_sweeps_staging_and_restores_trash() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());

        let staging = root.path().join(".reskin-staging-dead");
        tokio::fs::create_dir_all(&staging).await.unwrap();

        let trash = root.path().join(".reskin-trash-dead");
        tokio::fs::create_dir_all(&trash).await.unwrap();
        tokio::fs::write(
            trash.join("reskin.json"),
            r#"{"name":"Cool","author":"a","version":"1","license":"MIT"}"#,
        )
        .await
        .unwrap();

        let report = installer.recover().await.unwrap();

        assert_eq!(report.removed, vec![staging.clone()]);
        assert_eq!(report.restored, vec![root.path().join("Cool")]);
        assert!(!staging.exists());
        assert!(root.path().join("Cool/reskin.json").exists());
    }

    #[cfg(unix)]
    fn stores(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(STORE_PREFIX))
            .collect();
        names.sort();
        names
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reinstall_relinks_and_drops_previous_store() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());
        let location = root.path().join("Cool");

        installer.install(&package("Cool"), "Cool", false).await.unwrap();
        let first = std::fs::read_link(&location).unwrap();
        installer.install(&package("Cool"), "Cool", false).await.unwrap();
        let second = std::fs::read_link(&location).unwrap();

        assert_ne!(first, second);
        assert_eq!(stores(root.path()), vec![second.to_string_lossy().into_owned()]);
        assert!(!root.path().join(&first).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_plain_directory_is_converted_to_link() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());
        let location = root.path().join("Cool");
        tokio::fs::create_dir_all(&location).await.unwrap();
        tokio::fs::write(location.join("old.txt"), "old").await.unwrap();

        installer.install(&package("Cool"), "Cool", false).await.unwrap();

        let meta = tokio::fs::symlink_metadata(&location).await.unwrap();
        assert!(meta.file_type().is_symlink());
        assert!(!location.join("old.txt").exists());
        assert_eq!(stores(root.path()).len(), 1);
        assert!(installer.recover().await.unwrap().removed.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_foreign_link_target_survives_reinstall() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());
        tokio::fs::write(elsewhere.path().join("mine.css"), "x").await.unwrap();
        tokio::fs::symlink(elsewhere.path(), root.path().join("Cool")).await.unwrap();

        installer.install(&package("Cool"), "Cool", false).await.unwrap();

        assert!(elsewhere.path().join("mine.css").exists());
        assert!(root.path().join("Cool/gtk-3.0/gtk.css").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recover_drops_unlinked_stores_and_pending_links() {
        let root = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let installer = installer(root.path(), state.path());
        installer.install(&package("Cool"), "Cool", false).await.unwrap();
        let linked = stores(root.path());

        let orphan = root.path().join(".reskin-store-orphan");
        tokio::fs::create_dir_all(&orphan).await.unwrap();
        let pending = root.path().join(".reskin-link-dead");
        tokio::fs::symlink(".reskin-store-orphan", &pending).await.unwrap();

        let mut report = installer.recover().await.unwrap();
        report.removed.sort();

        assert_eq!(report.removed, vec![pending.clone(), orphan.clone()]);
        assert!(report.restored.is_empty());
        assert!(tokio::fs::symlink_metadata(&pending).await.is_err());
        assert!(!orphan.exists());
        assert_eq!(stores(root.path()), linked);
        assert!(root.path().join("Cool/reskin.json").exists());
    }
}
