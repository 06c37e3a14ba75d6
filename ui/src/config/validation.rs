use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max_package_size_mib: {configured} (min: {min_limit}, max: {max_limit})")]
    MaxPackageSize {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error(
        "Invalid catalog.request_timeout_secs: {configured} (min: {min_limit}, max: {max_limit})"
    )]
    RequestTimeout {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error("Unknown apply.backend: {configured}")]
    ApplyBackend { configured: String },
    #[error("apply.command is required for the command backend")]
    MissingApplyCommand,
    #[error("Invalid logging.level: {configured}")]
    LogLevel { configured: String },
    #[error("install_location cannot be empty")]
    EmptyInstallLocation,
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::MaxPackageSize {
                configured,
                min_limit,
                max_limit,
            } => format!(
                "Package size limit out of range!\n\n\
                Your configured value: {configured} MiB\n\
                Valid range: {min_limit} - {max_limit} MiB\n\n\
                Please update max_package_size_mib in config.toml."
            ),
            ConfigValidationError::RequestTimeout {
                configured,
                min_limit,
                max_limit,
            } => format!(
                "Catalog request timeout out of range!\n\n\
                Your configured value: {configured} seconds\n\
                Valid range: {min_limit} - {max_limit} seconds\n\n\
                Please update request_timeout_secs in the [catalog] section of config.toml."
            ),
            ConfigValidationError::ApplyBackend { configured } => format!(
                "Unknown apply backend '{configured}'!\n\n\
                Supported backends: {}\n\n\
                Please update backend in the [apply] section of config.toml.",
                super::limits::APPLY_BACKENDS.join(", ")
            ),
            ConfigValidationError::MissingApplyCommand => "The command apply backend needs a command!\n\n\
                Set command in the [apply] section of config.toml, for example:\n\
                command = [\"gsettings\", \"set\", \"org.gnome.desktop.interface\", \"gtk-theme\", \"{theme}\"]"
                .to_string(),
            ConfigValidationError::LogLevel { configured } => format!(
                "Unknown log level '{configured}'!\n\n\
                Supported levels: {}\n\n\
                Please update level in the [logging] section of config.toml.",
                super::limits::LOG_LEVELS.join(", ")
            ),
            ConfigValidationError::EmptyInstallLocation => "The install location is empty!\n\n\
                Please set install_location in config.toml or remove it to use ~/.themes."
                .to_string(),
        }
    }
}

/// Configuration loading result
#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
    ValidationError(Vec<ConfigValidationError>),
}

impl ConfigLoadResult {
    /// The loaded configuration, or a message describing why there is none
    pub fn as_result(&self) -> Result<&AppConfig, String> {
        match self {
            ConfigLoadResult::Success(config) => Ok(config),
            ConfigLoadResult::LoadError(msg) | ConfigLoadResult::DeserializeError(msg) => {
                Err(msg.clone())
            }
            ConfigLoadResult::ValidationError(errors) => Err(format!(
                "Configuration validation failed:\n{}",
                errors
                    .iter()
                    .map(|e| e.user_message())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            )),
        }
    }
}
