use crate::applier::Applied;
use crate::common::ThemeError;
use crate::installer::InstallReport;
use crate::manifest::ThemeManifest;
use crate::recent::RecentTheme;
use crate::verifier::InstallState;
use std::path::PathBuf;

/// Responses to [`ThemeCommand`](super::ThemeCommand)s.
///
/// # Examples
///
/// ```no_run
/// use engine::theme_manager::ThemeResponse;
/// # async fn demo(manager: &engine::theme_manager::ThemeManager, command: engine::theme_manager::ThemeCommand) {
///
/// match manager.execute_command(command).await {
///     ThemeResponse::ThemeInfo { manifest } => println!("{} by {}", manifest.name, manifest.author),
///     ThemeResponse::Error { error } => eprintln!("{error}"),
///     other => println!("{other:?}"),
/// }
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeResponse {
    /// Answer to `ExtractThemeInfo` and `ExtractThemeInfoFromFile`.
    ThemeInfo { manifest: ThemeManifest },

    /// Answer to `InstallThemeFromData` and `DownloadTheme`.
    ThemeInstalled { report: InstallReport },

    ThemeApplied { applied: Applied },

    AppVersion { version: String },

    InstallState {
        theme_name: String,
        state: InstallState,
    },

    RecentThemes { themes: Vec<RecentTheme> },

    ThemeBundled { output_path: PathBuf, size: u64 },

    Error { error: ThemeError },
}

impl ThemeResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ThemeResponse::Error { .. })
    }

    /// Splits the response into the success payload or the error.
    pub fn into_result(self) -> Result<ThemeResponse, ThemeError> {
        match self {
            ThemeResponse::Error { error } => Err(error),
            other => Ok(other),
        }
    }
}
