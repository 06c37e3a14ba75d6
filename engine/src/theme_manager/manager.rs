use super::command_handlers::*;
use super::commands::ThemeCommand;
use super::responses::ThemeResponse;
use crate::applier::{ApplyBackend, Applier};
use crate::catalog::CatalogClient;
use crate::common::{DEFAULT_MAX_PACKAGE_SIZE, InstallError, ThemeResult};
use crate::install_root::InstallRoot;
use crate::installer::{Installer, RecoveryReport};
use crate::package::PackageDecoder;
use crate::recent::RecentThemes;
use crate::verifier::InstalledStateVerifier;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Executes [`ThemeCommand`]s.
///
/// The presentation layer only ever talks to the engine through this trait,
/// so a recording implementation can prove which native calls were made.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: ThemeCommand) -> ThemeResponse;
}

/// Paths and limits the manager is built from.
#[derive(Debug, Clone)]
pub struct ThemeManagerConfig {
    pub install_root: InstallRoot,
    /// Directory for `recent.json` and apply state.
    pub state_dir: PathBuf,
    pub max_package_size: usize,
}

impl ThemeManagerConfig {
    pub fn new(install_root: InstallRoot, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_root,
            state_dir: state_dir.into(),
            max_package_size: DEFAULT_MAX_PACKAGE_SIZE,
        }
    }
}

/// Central coordinator of the theme lifecycle.
///
/// Owns the decoder, verifier, installer and applier, and dispatches each
/// command to a specialized handler:
/// - [`PackageCommandHandler`] - Manifest extraction and bundling
/// - [`InstallCommandHandler`] - Installs from data and from the catalog
/// - [`ApplyCommandHandler`] - Theme activation
/// - [`StatusCommandHandler`] - Installed state, recent themes and version
///
/// # Examples
///
/// ```no_run
/// use engine::applier::StateFileBackend;
/// use engine::install_root::InstallRoot;
/// use engine::theme_manager::{ThemeCommand, ThemeManager, ThemeManagerConfig};
/// use std::sync::Arc;
/// # async fn demo() {
///
/// let config = ThemeManagerConfig::new(InstallRoot::default_location(), "/tmp/reskin");
/// let backend = Arc::new(StateFileBackend::new("/tmp/reskin", false));
/// let manager = ThemeManager::new(config, backend, None);
///
/// let response = manager
///     .execute_command(ThemeCommand::CheckInstalled { theme_name: "Cool".to_string() })
///     .await;
/// # }
/// ```
pub struct ThemeManager {
    verifier: InstalledStateVerifier,
    installer: Arc<Installer>,
    applier: Arc<Applier>,
    package_handler: PackageCommandHandler,
    install_handler: InstallCommandHandler,
    apply_handler: ApplyCommandHandler,
    status_handler: StatusCommandHandler,
}

impl ThemeManager {
    pub fn new(
        config: ThemeManagerConfig,
        backend: Arc<dyn ApplyBackend>,
        catalog: Option<Arc<dyn CatalogClient>>,
    ) -> Self {
        let decoder = PackageDecoder::new(config.max_package_size);
        let verifier = InstalledStateVerifier::new(config.install_root.clone());
        let applier = Arc::new(Applier::new(verifier.clone(), backend));
        let installer = Arc::new(Installer::new(
            config.install_root,
            decoder,
            applier.clone(),
        ));
        let recent = Arc::new(RecentThemes::new(&config.state_dir));

        Self {
            package_handler: PackageCommandHandler::new(decoder),
            install_handler: InstallCommandHandler::new(
                decoder,
                installer.clone(),
                recent.clone(),
                catalog,
            ),
            apply_handler: ApplyCommandHandler::new(applier.clone()),
            status_handler: StatusCommandHandler::new(verifier.clone(), recent),
            verifier,
            installer,
            applier,
        }
    }

    pub fn verifier(&self) -> &InstalledStateVerifier {
        &self.verifier
    }

    pub fn applier(&self) -> &Applier {
        &self.applier
    }

    /// Sweeps leftovers of interrupted installs. Call once before serving commands.
    pub async fn recover(&self) -> Result<RecoveryReport, InstallError> {
        self.installer.recover().await
    }

    /// Executes a command, converting any failure into [`ThemeResponse::Error`].
    pub async fn execute_command(&self, command: ThemeCommand) -> ThemeResponse {
        let name = command.name();
        log::debug!("Executing command: {command:?}");

        match self.handle_command(command).await {
            Ok(response) => response,
            Err(error) => {
                log::error!("Command {name} failed ({}): {error}", error.kind());
                ThemeResponse::Error { error }
            }
        }
    }

    async fn handle_command(&self, command: ThemeCommand) -> ThemeResult<ThemeResponse> {
        match command {
            // Package commands
            ThemeCommand::ExtractThemeInfo { file_data } => {
                self.package_handler.handle_extract_theme_info(&file_data)
            }
            ThemeCommand::ExtractThemeInfoFromFile { file_path } => {
                self.package_handler
                    .handle_extract_theme_info_from_file(&file_path)
                    .await
            }
            ThemeCommand::BundleTheme {
                theme_directory,
                manifest,
                output_path,
            } => {
                self.package_handler
                    .handle_bundle_theme(&theme_directory, manifest, output_path)
                    .await
            }

            // Install commands
            ThemeCommand::InstallThemeFromData {
                file_data,
                file_name,
                auto_apply,
            } => {
                self.install_handler
                    .handle_install_theme_from_data(file_data, file_name, auto_apply)
                    .await
            }
            ThemeCommand::DownloadTheme {
                theme_file_id,
                theme_name,
                auto_apply,
            } => {
                self.install_handler
                    .handle_download_theme(theme_file_id, theme_name, auto_apply)
                    .await
            }

            // Apply commands
            ThemeCommand::ApplyTheme { theme_name } => {
                self.apply_handler.handle_apply_theme(theme_name).await
            }

            // Status commands
            ThemeCommand::CheckInstalled { theme_name } => {
                self.status_handler.handle_check_installed(theme_name).await
            }
            ThemeCommand::GetRecentThemes => self.status_handler.handle_get_recent_themes().await,
            ThemeCommand::GetAppVersion => self.status_handler.handle_get_app_version(),
        }
    }
}

#[async_trait]
impl CommandExecutor for ThemeManager {
    async fn execute(&self, command: ThemeCommand) -> ThemeResponse {
        self.execute_command(command).await
    }
}
