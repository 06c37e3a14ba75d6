use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod app;
pub mod limits;
pub mod setup;
pub mod validation;

pub use app::{AppConfig, ApplyConfig, CatalogSettings};
pub use validation::{ConfigLoadResult, ConfigValidationError};

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "RESKIN";

/// Global configuration, loaded once at startup
static CONFIG: std::sync::OnceLock<ConfigLoadResult> = std::sync::OnceLock::new();

/// Loads the configuration from `explicit_path` (required when given) or the
/// discovered `config.toml` (optional), then the environment.
pub fn load_config(explicit_path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let mut builder = Config::builder();
    match explicit_path {
        Some(path) => {
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            if let Some(path) = setup::find_config_file() {
                log::debug!("Using config file {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    // Environment entries override file values when present
    let env_source = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true);

    let config = match builder.add_source(env_source).build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    let app_config = match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => app_config,
        Err(e) => {
            return ConfigLoadResult::DeserializeError(format!(
                "Failed to deserialize config: {e}"
            ));
        }
    };

    match app_config.validate() {
        Ok(()) => ConfigLoadResult::Success(Box::new(app_config)),
        Err(errors) => ConfigLoadResult::ValidationError(errors),
    }
}

/// Loads the global configuration on first call and returns it
pub fn init_config(explicit_path: Option<&Path>) -> &'static ConfigLoadResult {
    CONFIG.get_or_init(|| load_config(explicit_path))
}

/// The global configuration, loading it from the default locations if needed
pub fn get_config() -> &'static ConfigLoadResult {
    CONFIG.get_or_init(|| load_config(None))
}

/// Additional logging configuration
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "install_location = \"/srv/themes\"\nauto_apply = true\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let result = load_config(Some(&path));
        let config = assert_ok!(result.as_result());
        assert!(config.auto_apply());
        assert_eq!(config.install_root().path(), Path::new("/srv/themes"));
        assert_eq!(config.logging().level(), "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, ConfigLoadResult::LoadError(_)));
    }

    #[test]
    fn test_invalid_values_are_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_package_size_mib = 5000\n").unwrap();

        match load_config(Some(&path)) {
            ConfigLoadResult::ValidationError(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(
                    errors[0],
                    ConfigValidationError::MaxPackageSize { configured: 5000, .. }
                ));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_deserialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "auto_apply = \"sometimes\"\n").unwrap();

        let result = load_config(Some(&path));
        assert_err!(result.as_result());
        assert!(matches!(result, ConfigLoadResult::DeserializeError(_)));
    }
}
