use crate::manifest::ThemeManifest;
use std::path::PathBuf;

/// Commands accepted by the [`ThemeManager`](super::ThemeManager).
///
/// This is the whole native surface the presentation layer can reach. Each
/// command is answered by exactly one [`ThemeResponse`](super::ThemeResponse).
///
/// # Examples
///
/// ```no_run
/// use engine::theme_manager::ThemeCommand;
/// # fn demo(bytes: Vec<u8>) {
///
/// // Preview a package the user picked
/// let command = ThemeCommand::ExtractThemeInfo { file_data: bytes };
/// # let bytes = Vec::new();
///
/// // Install it and apply right away
/// let command = ThemeCommand::InstallThemeFromData {
///     file_data: bytes,
///     file_name: "cool.reskin".to_string(),
///     auto_apply: true,
/// };
/// # }
/// ```
#[derive(Clone)]
pub enum ThemeCommand {
    /// Decode the manifest of in-memory package bytes. No side effects.
    ExtractThemeInfo { file_data: Vec<u8> },

    /// Read a package from disk and decode its manifest.
    ExtractThemeInfoFromFile { file_path: PathBuf },

    /// Install package bytes under the name in their manifest.
    InstallThemeFromData {
        file_data: Vec<u8>,
        /// Name of the file the bytes came from, for logs
        file_name: String,
        auto_apply: bool,
    },

    /// Download a package from the catalog and install it under `theme_name`.
    DownloadTheme {
        theme_file_id: String,
        theme_name: String,
        auto_apply: bool,
    },

    /// Activate an installed theme.
    ApplyTheme { theme_name: String },

    GetAppVersion,

    /// Re-query installed state. Never cached.
    CheckInstalled { theme_name: String },

    GetRecentThemes,

    /// Bundle a directory into a package written to `output_path`.
    BundleTheme {
        theme_directory: PathBuf,
        manifest: ThemeManifest,
        output_path: PathBuf,
    },
}

impl ThemeCommand {
    /// Short label for logs. Package bytes are never logged.
    pub fn name(&self) -> &'static str {
        match self {
            ThemeCommand::ExtractThemeInfo { .. } => "extract_theme_info",
            ThemeCommand::ExtractThemeInfoFromFile { .. } => "extract_theme_info_from_file",
            ThemeCommand::InstallThemeFromData { .. } => "install_theme_from_data",
            ThemeCommand::DownloadTheme { .. } => "download_theme",
            ThemeCommand::ApplyTheme { .. } => "apply_theme",
            ThemeCommand::GetAppVersion => "get_app_version",
            ThemeCommand::CheckInstalled { .. } => "check_installed",
            ThemeCommand::GetRecentThemes => "get_recent_themes",
            ThemeCommand::BundleTheme { .. } => "bundle_theme",
        }
    }
}

impl std::fmt::Debug for ThemeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeCommand::ExtractThemeInfo { file_data } => f
                .debug_struct("ExtractThemeInfo")
                .field("file_data", &format_args!("{} bytes", file_data.len()))
                .finish(),
            ThemeCommand::ExtractThemeInfoFromFile { file_path } => f
                .debug_struct("ExtractThemeInfoFromFile")
                .field("file_path", file_path)
                .finish(),
            ThemeCommand::InstallThemeFromData {
                file_data,
                file_name,
                auto_apply,
            } => f
                .debug_struct("InstallThemeFromData")
                .field("file_data", &format_args!("{} bytes", file_data.len()))
                .field("file_name", file_name)
                .field("auto_apply", auto_apply)
                .finish(),
            ThemeCommand::DownloadTheme {
                theme_file_id,
                theme_name,
                auto_apply,
            } => f
                .debug_struct("DownloadTheme")
                .field("theme_file_id", theme_file_id)
                .field("theme_name", theme_name)
                .field("auto_apply", auto_apply)
                .finish(),
            ThemeCommand::ApplyTheme { theme_name } => f
                .debug_struct("ApplyTheme")
                .field("theme_name", theme_name)
                .finish(),
            ThemeCommand::GetAppVersion => f.write_str("GetAppVersion"),
            ThemeCommand::CheckInstalled { theme_name } => f
                .debug_struct("CheckInstalled")
                .field("theme_name", theme_name)
                .finish(),
            ThemeCommand::GetRecentThemes => f.write_str("GetRecentThemes"),
            ThemeCommand::BundleTheme {
                theme_directory,
                manifest,
                output_path,
            } => f
                .debug_struct("BundleTheme")
                .field("theme_directory", theme_directory)
                .field("theme", &manifest.name)
                .field("output_path", output_path)
                .finish(),
        }
    }
}
