use crate::common::{InstallError, MANIFEST_FILE_NAME};
use crate::package::DecodedPackage;
use std::path::Path;

/// Writes every asset and the manifest into `staging_dir`.
///
/// The manifest is written last so it always reflects the validated manifest,
/// even if the package carries an asset with the same name.
pub async fn stage(staging_dir: &Path, package: &DecodedPackage<'_>) -> Result<(), InstallError> {
    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| InstallError::io("create staging directory", staging_dir, e))?;

    for entry in &package.entries {
        let target = staging_dir.join(&entry.relative_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::io("create directory", parent, e))?;
        }
        tokio::fs::write(&target, entry.data)
            .await
            .map_err(|e| InstallError::io("write asset", &target, e))?;
    }

    let manifest_json = package.manifest.to_json_pretty().map_err(|e| InstallError::Io {
        operation: "serialize manifest".to_string(),
        path: staging_dir.join(MANIFEST_FILE_NAME),
        reason: e.to_string(),
    })?;
    let manifest_path = staging_dir.join(MANIFEST_FILE_NAME);
    tokio::fs::write(&manifest_path, manifest_json)
        .await
        .map_err(|e| InstallError::io("write manifest", &manifest_path, e))?;

    Ok(())
}

/// Best-effort removal of a scratch directory.
pub async fn discard(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {e}", dir.display()),
    }
}
