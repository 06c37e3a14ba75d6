use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use engine::applier::{ApplyBackend, CommandBackend, StateFileBackend};
use engine::catalog::HttpCatalog;
use engine::theme_manager::{ThemeManager, ThemeManagerConfig};
use std::path::Path;
use std::sync::Arc;

/// The apply backend selected by `[apply]`
pub fn apply_backend(config: &AppConfig, state_dir: &Path) -> AppResult<Arc<dyn ApplyBackend>> {
    let apply = config.apply();
    match apply.backend() {
        "state_file" => Ok(Arc::new(StateFileBackend::new(
            state_dir,
            config.backup_config(),
        ))),
        "command" => {
            let backend = CommandBackend::new(
                apply.command().to_vec(),
                apply.query().map(<[String]>::to_vec),
            )
            .ok_or_else(|| {
                AppError::Config("apply.command is required for the command backend".to_string())
            })?;
            Ok(Arc::new(backend))
        }
        other => Err(AppError::Config(format!("Unknown apply backend '{other}'"))),
    }
}

/// The catalog client, or `None` when no endpoint is configured
pub fn catalog_client(config: &AppConfig) -> AppResult<Option<Arc<HttpCatalog>>> {
    match config.catalog_config() {
        Some(catalog_config) => Ok(Some(Arc::new(HttpCatalog::new(catalog_config)?))),
        None => Ok(None),
    }
}

/// Builds the engine and sweeps leftovers of interrupted installs.
///
/// Fails only when the install root cannot be created.
pub async fn build_manager(
    config: &AppConfig,
    state_dir: &Path,
    catalog: Option<Arc<HttpCatalog>>,
) -> AppResult<ThemeManager> {
    let install_root = config.install_root();
    install_root.ensure_exists().await.map_err(|e| {
        AppError::Io(format!(
            "Install location {} is not accessible: {e}",
            install_root.path().display()
        ))
    })?;

    let mut manager_config = ThemeManagerConfig::new(install_root, state_dir);
    manager_config.max_package_size = config.max_package_size();

    let catalog = catalog.map(|c| c as Arc<dyn engine::catalog::CatalogClient>);
    let manager = ThemeManager::new(manager_config, apply_backend(config, state_dir)?, catalog);

    match manager.recover().await {
        Ok(report) if !report.removed.is_empty() || !report.restored.is_empty() => log::info!(
            "Cleaned up after interrupted installs: {} removed, {} restored",
            report.removed.len(),
            report.restored.len()
        ),
        Ok(_) => {}
        Err(e) => log::warn!("Failed to clean up interrupted installs: {e}"),
    }

    Ok(manager)
}
