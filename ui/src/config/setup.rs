use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum SetupError {
    #[error("Failed to determine config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to create directory {path}: {source}")]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write file {path}: {source}")]
    WriteFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to set file permissions for {path}: {source}")]
    PermissionError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Starting point written by `reskin config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Reskin configuration
# Environment variables override these values, e.g. RESKIN_AUTO_APPLY=true
# or RESKIN_CATALOG__ENDPOINT=https://cloud.example.com/v1

# Where themes are installed
install_location = "~/.themes"

# Apply a theme right after installing it
auto_apply = false

# Keep a copy of the previous active-theme record before applying
backup_config = false

# Largest accepted .reskin package
max_package_size_mib = 100

[apply]
# "state_file" records the active theme; "command" runs a program
backend = "state_file"
# command = ["gsettings", "set", "org.gnome.desktop.interface", "gtk-theme", "{theme}"]
# query = ["gsettings", "get", "org.gnome.desktop.interface", "gtk-theme"]

[catalog]
# endpoint = "https://cloud.example.com/v1"
project_id = "reskin"
database_id = "reskin"
themes_collection_id = "themes"
reports_collection_id = "reports"
files_bucket_id = "themes"
request_timeout_secs = 30

[logging]
level = "info"
# file = "/tmp/reskin.log"
"#;

/// Get the standard configuration directory for the current platform
pub fn get_config_dir() -> Result<PathBuf, SetupError> {
    // Prefer ~/.config/reskin on Unix-like systems
    if cfg!(unix) {
        if let Some(mut home_path) = dirs::home_dir() {
            home_path.push(".config");
            home_path.push("reskin");
            return Ok(home_path);
        }
    }

    dirs::config_dir()
        .map(|mut path| {
            path.push("reskin");
            path
        })
        .ok_or_else(|| {
            SetupError::ConfigDirError("Unable to determine config directory".to_string())
        })
}

/// Get the standard configuration file path
pub fn get_config_file_path() -> Result<PathBuf, SetupError> {
    let mut config_dir = get_config_dir()?;
    config_dir.push("config.toml");
    Ok(config_dir)
}

/// Initialize `config_dir` with a default `config.toml`.
///
/// An existing config file is left alone. Returns the config file path.
pub fn initialize_config_dir(config_dir: &Path) -> Result<PathBuf, SetupError> {
    create_dir_if_not_exists(config_dir)?;

    let config_file = config_dir.join("config.toml");
    if config_file.exists() {
        log::info!("Config file already exists: {}", config_file.display());
    } else {
        write_file_with_permissions(&config_file, DEFAULT_CONFIG_TEMPLATE)?;
        log::info!("Created config file: {}", config_file.display());
    }

    Ok(config_file)
}

/// Create directory if it doesn't exist
pub fn create_dir_if_not_exists(path: &Path) -> Result<(), SetupError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| SetupError::CreateDirError {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write file with appropriate permissions (600 for config files)
fn write_file_with_permissions(path: &Path, content: &str) -> Result<(), SetupError> {
    fs::write(path, content).map_err(|source| SetupError::WriteFileError {
        path: path.to_path_buf(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(0o600); // rw-------
        fs::set_permissions(path, permissions).map_err(|source| SetupError::PermissionError {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(())
}

/// Find config file using discovery priority
pub fn find_config_file() -> Option<PathBuf> {
    // 1. ./config.toml
    // 2. Standard OS config directory
    let current_dir_config = PathBuf::from("config.toml");
    if current_dir_config.exists() {
        return Some(current_dir_config);
    }

    match get_config_file_path() {
        Ok(standard_config) if standard_config.exists() => Some(standard_config),
        _ => None,
    }
}
