use super::{LoggingConfig, limits::*, validation::ConfigValidationError};
use engine::catalog::{CatalogConfig, DEFAULT_REQUEST_TIMEOUT};
use engine::install_root::InstallRoot;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    install_location: Option<String>,
    auto_apply: Option<bool>,
    backup_config: Option<bool>,
    max_package_size_mib: Option<u64>,

    #[serde(default)]
    apply: ApplyConfig,
    #[serde(default)]
    catalog: CatalogSettings,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if self
            .install_location
            .as_deref()
            .is_some_and(|location| location.trim().is_empty())
        {
            errors.push(ConfigValidationError::EmptyInstallLocation);
        }

        let size = self.max_package_size_mib();
        if !(MIN_PACKAGE_SIZE_MIB..=MAX_PACKAGE_SIZE_MIB).contains(&size) {
            errors.push(ConfigValidationError::MaxPackageSize {
                configured: size,
                min_limit: MIN_PACKAGE_SIZE_MIB,
                max_limit: MAX_PACKAGE_SIZE_MIB,
            });
        }

        if let Some(timeout) = self.catalog.request_timeout_secs {
            if !(MIN_REQUEST_TIMEOUT_SECS..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout) {
                errors.push(ConfigValidationError::RequestTimeout {
                    configured: timeout,
                    min_limit: MIN_REQUEST_TIMEOUT_SECS,
                    max_limit: MAX_REQUEST_TIMEOUT_SECS,
                });
            }
        }

        let backend = self.apply.backend();
        if !APPLY_BACKENDS.contains(&backend) {
            errors.push(ConfigValidationError::ApplyBackend {
                configured: backend.to_string(),
            });
        } else if backend == "command" && self.apply.command().is_empty() {
            errors.push(ConfigValidationError::MissingApplyCommand);
        }

        let level = self.logging.level().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::LogLevel {
                configured: self.logging.level().to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Where themes are installed, with `~` expanded
    pub fn install_root(&self) -> InstallRoot {
        match self.install_location.as_deref() {
            Some(location) => InstallRoot::from_location(location),
            None => InstallRoot::default_location(),
        }
    }

    pub fn auto_apply(&self) -> bool {
        self.auto_apply.unwrap_or(false)
    }

    /// Back up the active-theme record before each apply
    pub fn backup_config(&self) -> bool {
        self.backup_config.unwrap_or(false)
    }

    pub fn max_package_size_mib(&self) -> u64 {
        self.max_package_size_mib.unwrap_or(DEFAULT_PACKAGE_SIZE_MIB)
    }

    pub fn max_package_size(&self) -> usize {
        usize::try_from(self.max_package_size_mib().saturating_mul(1024 * 1024))
            .unwrap_or(usize::MAX)
    }

    pub fn apply(&self) -> &ApplyConfig {
        &self.apply
    }

    pub fn catalog(&self) -> &CatalogSettings {
        &self.catalog
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Catalog client settings, or `None` when no endpoint is configured
    pub fn catalog_config(&self) -> Option<CatalogConfig> {
        self.catalog.to_catalog_config()
    }
}

/// How themes are activated
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApplyConfig {
    backend: Option<String>,
    /// Program and arguments. `{theme}` and `{path}` are substituted.
    command: Option<Vec<String>>,
    /// Program printing the active theme name
    query: Option<Vec<String>>,
}

impl ApplyConfig {
    pub fn backend(&self) -> &str {
        self.backend.as_deref().unwrap_or("state_file")
    }

    pub fn command(&self) -> &[String] {
        self.command.as_deref().unwrap_or_default()
    }

    pub fn query(&self) -> Option<&[String]> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }
}

/// Hosted catalog settings
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct CatalogSettings {
    endpoint: Option<String>,
    project_id: Option<String>,
    api_key: Option<String>,
    database_id: Option<String>,
    themes_collection_id: Option<String>,
    reports_collection_id: Option<String>,
    files_bucket_id: Option<String>,
    request_timeout_secs: Option<u64>,
    recovery_redirect_url: Option<String>,
}

impl CatalogSettings {
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn to_catalog_config(&self) -> Option<CatalogConfig> {
        let endpoint = self.endpoint()?;
        let defaults = CatalogConfig::default();

        Some(CatalogConfig {
            endpoint: endpoint.to_string(),
            project_id: self.project_id.clone().unwrap_or(defaults.project_id),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            database_id: self.database_id.clone().unwrap_or(defaults.database_id),
            themes_collection_id: self
                .themes_collection_id
                .clone()
                .unwrap_or(defaults.themes_collection_id),
            reports_collection_id: self
                .reports_collection_id
                .clone()
                .unwrap_or(defaults.reports_collection_id),
            files_bucket_id: self
                .files_bucket_id
                .clone()
                .unwrap_or(defaults.files_bucket_id),
            request_timeout: self.request_timeout(),
            recovery_redirect_url: self
                .recovery_redirect_url
                .clone()
                .unwrap_or(defaults.recovery_redirect_url),
        })
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "<redacted>".to_string()),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for CatalogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSettings")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Copy of the configuration safe to print
    pub fn redacted(&self) -> Self {
        Self {
            catalog: self.catalog.redacted(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;

    fn parse(toml_str: &str) -> AppConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_ok!(config.validate());
        assert!(!config.auto_apply());
        assert!(!config.backup_config());
        assert_eq!(config.max_package_size(), 100 * 1024 * 1024);
        assert_eq!(config.apply().backend(), "state_file");
        assert_eq!(config.logging().level(), "info");
        assert_none!(config.catalog_config());
    }

    #[test]
    fn test_catalog_config_fills_defaults() {
        let config = parse(
            r#"
            [catalog]
            endpoint = "https://cloud.example.com/v1"
            api_key = "secret"
            request_timeout_secs = 5
            "#,
        );

        let catalog = assert_some!(config.catalog_config());
        assert_eq!(catalog.endpoint, "https://cloud.example.com/v1");
        assert_eq!(catalog.project_id, "reskin");
        assert_eq!(catalog.api_key.as_deref(), Some("secret"));
        assert_eq!(catalog.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation_collects_every_error() {
        let config = parse(
            r#"
            max_package_size_mib = 0
            [apply]
            backend = "command"
            [catalog]
            request_timeout_secs = 9000
            [logging]
            level = "loud"
            "#,
        );

        let errors = assert_err!(config.validate());
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ConfigValidationError::MissingApplyCommand));
        assert!(errors.contains(&ConfigValidationError::LogLevel {
            configured: "loud".to_string()
        }));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let config = parse("[apply]\nbackend = \"registry\"\n");
        assert_eq!(
            config.validate(),
            Err(vec![ConfigValidationError::ApplyBackend {
                configured: "registry".to_string()
            }])
        );
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let config = parse("[catalog]\nendpoint = \"https://x\"\napi_key = \"secret\"\n");
        let printed = toml::to_string(&config.redacted()).unwrap();

        assert!(!printed.contains("secret"));
        assert!(!format!("{config:?}").contains("secret"));
    }
}
