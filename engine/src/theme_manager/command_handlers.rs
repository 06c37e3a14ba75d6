use super::responses::ThemeResponse;
use crate::applier::Applier;
use crate::catalog::CatalogClient;
use crate::common::{CatalogError, DecodeError, ThemeError, ThemeResult, write_atomic};
use crate::installer::{InstallReport, Installer};
use crate::manifest::ThemeManifest;
use crate::package::{PackageBuilder, PackageDecoder};
use crate::recent::RecentThemes;
use crate::validation::ThemeName;
use crate::verifier::InstalledStateVerifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handles package inspection and bundling commands
pub struct PackageCommandHandler {
    decoder: PackageDecoder,
}

impl PackageCommandHandler {
    pub fn new(decoder: PackageDecoder) -> Self {
        Self { decoder }
    }

    pub fn handle_extract_theme_info(&self, file_data: &[u8]) -> ThemeResult<ThemeResponse> {
        let manifest = self.decoder.decode(file_data)?;
        Ok(ThemeResponse::ThemeInfo { manifest })
    }

    pub async fn handle_extract_theme_info_from_file(
        &self,
        file_path: &Path,
    ) -> ThemeResult<ThemeResponse> {
        let metadata = tokio::fs::metadata(file_path).await.map_err(|e| {
            ThemeError::Io(format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ))
        })?;

        // Refuse before reading a huge file into memory
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > self.decoder.max_package_size() {
            return Err(DecodeError::TooLarge {
                size,
                limit: self.decoder.max_package_size(),
            }
            .into());
        }

        let file_data = tokio::fs::read(file_path).await.map_err(|e| {
            ThemeError::Io(format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ))
        })?;
        self.handle_extract_theme_info(&file_data)
    }

    pub async fn handle_bundle_theme(
        &self,
        theme_directory: &Path,
        manifest: ThemeManifest,
        output_path: PathBuf,
    ) -> ThemeResult<ThemeResponse> {
        ThemeName::parse(manifest.name.as_str())?;

        let bytes = PackageBuilder::from_directory(manifest, theme_directory)
            .await?
            .build()?;
        write_atomic(&output_path, &bytes).await.map_err(|e| {
            ThemeError::Io(format!(
                "Failed to write bundle {}: {e}",
                output_path.display()
            ))
        })?;

        log::info!(
            "Bundle created at {} ({} bytes)",
            output_path.display(),
            bytes.len()
        );
        Ok(ThemeResponse::ThemeBundled {
            output_path,
            size: bytes.len() as u64,
        })
    }
}

/// Handles install and download commands
pub struct InstallCommandHandler {
    decoder: PackageDecoder,
    installer: Arc<Installer>,
    recent: Arc<RecentThemes>,
    catalog: Option<Arc<dyn CatalogClient>>,
}

impl InstallCommandHandler {
    pub fn new(
        decoder: PackageDecoder,
        installer: Arc<Installer>,
        recent: Arc<RecentThemes>,
        catalog: Option<Arc<dyn CatalogClient>>,
    ) -> Self {
        Self {
            decoder,
            installer,
            recent,
            catalog,
        }
    }

    pub async fn handle_install_theme_from_data(
        &self,
        file_data: Vec<u8>,
        file_name: String,
        auto_apply: bool,
    ) -> ThemeResult<ThemeResponse> {
        let manifest = self.decoder.decode(&file_data)?;
        log::info!("Installing '{}' from {file_name}", manifest.name);

        let report = self
            .installer
            .install(&file_data, &manifest.name, auto_apply)
            .await?;
        self.remember(&report).await;
        Ok(ThemeResponse::ThemeInstalled { report })
    }

    pub async fn handle_download_theme(
        &self,
        theme_file_id: String,
        theme_name: String,
        auto_apply: bool,
    ) -> ThemeResult<ThemeResponse> {
        let name = ThemeName::parse(theme_name)?;
        let catalog = self.catalog.as_ref().ok_or_else(|| {
            CatalogError::NotConfigured("set catalog.endpoint to download themes".to_string())
        })?;

        let file_data = catalog
            .download_package(&theme_file_id, self.decoder.max_package_size())
            .await?;

        let report = self
            .installer
            .install(&file_data, name.as_str(), auto_apply)
            .await?;
        self.remember(&report).await;
        Ok(ThemeResponse::ThemeInstalled { report })
    }

    async fn remember(&self, report: &InstallReport) {
        if let Err(e) = self.recent.record(&report.manifest).await {
            log::warn!(
                "Failed to record '{}' in recent themes: {e}",
                report.manifest.name
            );
        }
    }
}

/// Handles apply commands
pub struct ApplyCommandHandler {
    applier: Arc<Applier>,
}

impl ApplyCommandHandler {
    pub fn new(applier: Arc<Applier>) -> Self {
        Self { applier }
    }

    pub async fn handle_apply_theme(&self, theme_name: String) -> ThemeResult<ThemeResponse> {
        let applied = self.applier.apply(&theme_name).await?;
        Ok(ThemeResponse::ThemeApplied { applied })
    }
}

/// Handles state and metadata queries
pub struct StatusCommandHandler {
    verifier: InstalledStateVerifier,
    recent: Arc<RecentThemes>,
}

impl StatusCommandHandler {
    pub fn new(verifier: InstalledStateVerifier, recent: Arc<RecentThemes>) -> Self {
        Self { verifier, recent }
    }

    pub async fn handle_check_installed(&self, theme_name: String) -> ThemeResult<ThemeResponse> {
        let state = self.verifier.check(&theme_name).await?;
        Ok(ThemeResponse::InstallState { theme_name, state })
    }

    pub async fn handle_get_recent_themes(&self) -> ThemeResult<ThemeResponse> {
        Ok(ThemeResponse::RecentThemes {
            themes: self.recent.list().await,
        })
    }

    pub fn handle_get_app_version(&self) -> ThemeResult<ThemeResponse> {
        Ok(ThemeResponse::AppVersion {
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
