//! The install flow state machine.
//!
//! ```text
//! Idle -> Previewing -> Installing -> Installed -> Applying -> Applied
//!             |              |                        |
//!             +--------------+----------> Error <-----+
//! ```
//!
//! The controller only talks to the engine through a [`CommandExecutor`].
//! Every transition updates a [`StatusLine`]. Failures land in
//! [`LifecycleState::Error`] until [`LifecycleController::acknowledge`] is
//! called; nothing is retried automatically.

use crate::error::{AppError, AppResult};
use engine::applier::Applied;
use engine::catalog::Identity;
use engine::common::{ErrorKind, PACKAGE_EXTENSION, ThemeError};
use engine::installer::ApplyOutcome;
use engine::manifest::ThemeManifest;
use engine::theme_manager::{CommandExecutor, ThemeCommand, ThemeResponse};
use std::path::Path;
use std::sync::Arc;

/// Who is using the app. Passed in explicitly, never read from global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn display_name(&self) -> &str {
        match &self.identity {
            Some(identity) if !identity.name.is_empty() => &identity.name,
            Some(identity) => &identity.email,
            None => "anonymous",
        }
    }
}

/// Package bytes selected by the user, held for one flow only
#[derive(Clone)]
pub struct ThemePackage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ThemePackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemePackage")
            .field("file_name", &self.file_name)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// What a failure left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing on disk changed; trying again is safe
    NothingChanged,
    /// The theme was installed but could not be applied
    InstalledNotApplied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Previewing {
        manifest: ThemeManifest,
    },
    Installing {
        manifest: ThemeManifest,
    },
    Installed {
        manifest: ThemeManifest,
    },
    Applying {
        manifest: ThemeManifest,
    },
    Applied {
        manifest: ThemeManifest,
        applied: Applied,
    },
    Error {
        kind: ErrorKind,
        message: String,
        effect: Effect,
    },
}

impl LifecycleState {
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Previewing { .. } => "previewing",
            LifecycleState::Installing { .. } => "installing",
            LifecycleState::Installed { .. } => "installed",
            LifecycleState::Applying { .. } => "applying",
            LifecycleState::Applied { .. } => "applied",
            LifecycleState::Error { .. } => "error",
        }
    }

    pub fn manifest(&self) -> Option<&ThemeManifest> {
        match self {
            LifecycleState::Previewing { manifest }
            | LifecycleState::Installing { manifest }
            | LifecycleState::Installed { manifest }
            | LifecycleState::Applying { manifest }
            | LifecycleState::Applied { manifest, .. } => Some(manifest),
            LifecycleState::Idle | LifecycleState::Error { .. } => None,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Installed { .. } | LifecycleState::Applied { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One line of user-visible status text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// True when `file_name` has a stem and the `.reskin` extension.
///
/// A file named just `.reskin` is a hidden file with no extension and is
/// rejected.
pub fn has_package_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext == PACKAGE_EXTENSION)
}

/// Presentation-facing driver of one install flow at a time.
///
/// # Examples
///
/// ```no_run
/// use reskin::app::lifecycle::{LifecycleController, SessionContext};
/// # use engine::theme_manager::CommandExecutor;
/// # use std::path::Path;
/// # use std::sync::Arc;
/// # async fn demo(executor: Arc<dyn CommandExecutor>) -> reskin::AppResult<()> {
///
/// let mut controller = LifecycleController::new(executor, SessionContext::anonymous());
/// controller.select_path(Path::new("cool.reskin")).await?;
/// controller.confirm_install(false).await?;
/// println!("{}", controller.status().text);
/// # Ok(())
/// # }
/// ```
pub struct LifecycleController {
    executor: Arc<dyn CommandExecutor>,
    session: SessionContext,
    state: LifecycleState,
    status: StatusLine,
    package: Option<ThemePackage>,
}

impl LifecycleController {
    pub fn new(executor: Arc<dyn CommandExecutor>, session: SessionContext) -> Self {
        Self {
            executor,
            session,
            state: LifecycleState::Idle,
            status: StatusLine::info("Select a .reskin file to get started"),
            package: None,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn set_session(&mut self, session: SessionContext) {
        self.session = session;
    }

    /// The package held for the current flow
    pub fn package(&self) -> Option<&ThemePackage> {
        self.package.as_ref()
    }

    /// Reads a package file and previews it.
    ///
    /// The extension is checked before the file is opened.
    pub async fn select_path(&mut self, path: &Path) -> AppResult<&LifecycleState> {
        self.begin_action()?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.accept_file_name(&file_name) {
            return Ok(&self.state);
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => self.select_file(&file_name, bytes).await,
            Err(e) => {
                let message = format!("Failed to read {}: {e}", path.display());
                self.fail(ErrorKind::Io, message, Effect::NothingChanged);
                Ok(&self.state)
            }
        }
    }

    /// Previews package bytes the user picked.
    pub async fn select_file(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> AppResult<&LifecycleState> {
        self.begin_action()?;
        if !self.accept_file_name(file_name) {
            return Ok(&self.state);
        }

        self.package = None;
        self.status = StatusLine::success(format!("Selected {file_name}"));

        let response = self
            .executor
            .execute(ThemeCommand::ExtractThemeInfo {
                file_data: bytes.clone(),
            })
            .await;

        match response {
            ThemeResponse::ThemeInfo { manifest } => {
                self.package = Some(ThemePackage {
                    file_name: file_name.to_string(),
                    bytes,
                });
                self.status = StatusLine::success(format!(
                    "Loaded '{}' by {}",
                    manifest.name, manifest.author
                ));
                self.transition(LifecycleState::Previewing { manifest });
            }
            ThemeResponse::Error { error } => {
                self.fail_with(error, Effect::NothingChanged);
            }
            other => self.unexpected(&other),
        }
        Ok(&self.state)
    }

    /// Installs the previewed package.
    ///
    /// With `auto_apply`, a successful install ends in `Applied`. An install
    /// that worked followed by a failed apply ends in `Error` with
    /// [`Effect::InstalledNotApplied`].
    pub async fn confirm_install(&mut self, auto_apply: bool) -> AppResult<&LifecycleState> {
        let manifest = match &self.state {
            LifecycleState::Previewing { manifest } => manifest.clone(),
            _ => {
                return Err(AppError::State(
                    "There is no theme to install. Select a .reskin file first.".to_string(),
                ));
            }
        };
        let package = self.package.take().ok_or_else(|| {
            AppError::State("The selected package is no longer available".to_string())
        })?;

        self.status = StatusLine::info(format!("Installing '{}'...", manifest.name));
        self.transition(LifecycleState::Installing { manifest });

        let response = self
            .executor
            .execute(ThemeCommand::InstallThemeFromData {
                file_data: package.bytes,
                file_name: package.file_name,
                auto_apply,
            })
            .await;

        match response {
            ThemeResponse::ThemeInstalled { report } => match report.apply {
                ApplyOutcome::NotRequested => {
                    self.status = StatusLine::success(format!(
                        "Theme '{}' installed",
                        report.manifest.name
                    ));
                    self.transition(LifecycleState::Installed {
                        manifest: report.manifest,
                    });
                }
                ApplyOutcome::Applied(applied) => {
                    self.status = StatusLine::success(format!(
                        "Theme '{}' installed and applied",
                        report.manifest.name
                    ));
                    self.transition(LifecycleState::Applied {
                        manifest: report.manifest,
                        applied,
                    });
                }
                ApplyOutcome::Failed(error) => {
                    let message = format!(
                        "Theme '{}' was installed but could not be applied: {error}",
                        report.manifest.name
                    );
                    self.fail(ErrorKind::Apply, message, Effect::InstalledNotApplied);
                }
            },
            ThemeResponse::Error { error } => self.fail_with(error, Effect::NothingChanged),
            other => self.unexpected(&other),
        }
        Ok(&self.state)
    }

    /// Applies the theme that was just installed.
    pub async fn apply(&mut self) -> AppResult<&LifecycleState> {
        let manifest = match &self.state {
            LifecycleState::Installed { manifest } => manifest.clone(),
            _ => {
                return Err(AppError::State(
                    "Install a theme before applying it".to_string(),
                ));
            }
        };

        self.status = StatusLine::info(format!("Applying '{}'...", manifest.name));
        self.transition(LifecycleState::Applying {
            manifest: manifest.clone(),
        });

        let response = self
            .executor
            .execute(ThemeCommand::ApplyTheme {
                theme_name: manifest.name.clone(),
            })
            .await;

        match response {
            ThemeResponse::ThemeApplied { applied } => {
                self.status = if applied.already_active {
                    StatusLine::success(format!("Theme '{}' is already active", manifest.name))
                } else {
                    StatusLine::success(format!("Theme '{}' applied", manifest.name))
                };
                self.transition(LifecycleState::Applied { manifest, applied });
            }
            ThemeResponse::Error { error } => self.fail_with(error, Effect::NothingChanged),
            other => self.unexpected(&other),
        }
        Ok(&self.state)
    }

    /// Drops the previewed package without touching disk.
    pub fn cancel(&mut self) -> AppResult<()> {
        match self.state {
            LifecycleState::Idle => Ok(()),
            LifecycleState::Previewing { .. } => {
                self.package = None;
                self.status = StatusLine::info("Installation cancelled");
                self.transition(LifecycleState::Idle);
                Ok(())
            }
            _ => Err(AppError::State(format!(
                "Cannot cancel while {}",
                self.state.label()
            ))),
        }
    }

    /// Clears an error so the next action can start.
    pub fn acknowledge(&mut self) {
        if matches!(self.state, LifecycleState::Error { .. }) {
            self.status = StatusLine::info("Select a .reskin file to get started");
            self.transition(LifecycleState::Idle);
        }
    }

    /// Finished flows return to Idle; an unacknowledged error blocks.
    fn begin_action(&mut self) -> AppResult<()> {
        match self.state {
            LifecycleState::Error { .. } => Err(AppError::State(
                "Acknowledge the last error before starting again".to_string(),
            )),
            LifecycleState::Installing { .. } | LifecycleState::Applying { .. } => Err(
                AppError::State(format!("Busy {}", self.state.label())),
            ),
            _ => {
                if self.state.is_terminal() {
                    self.transition(LifecycleState::Idle);
                }
                Ok(())
            }
        }
    }

    fn accept_file_name(&mut self, file_name: &str) -> bool {
        if has_package_extension(file_name) {
            return true;
        }
        log::info!("Rejected {file_name:?}: not a .{PACKAGE_EXTENSION} file");
        self.status = StatusLine::error(format!(
            "'{file_name}' is not a .{PACKAGE_EXTENSION} file. Please select a theme package."
        ));
        false
    }

    fn fail_with(&mut self, error: ThemeError, effect: Effect) {
        self.fail(error.kind(), error.to_string(), effect);
    }

    fn fail(&mut self, kind: ErrorKind, message: String, effect: Effect) {
        self.package = None;
        self.status = StatusLine::error(message.clone());
        self.transition(LifecycleState::Error {
            kind,
            message,
            effect,
        });
    }

    fn unexpected(&mut self, response: &ThemeResponse) {
        log::error!("Unexpected engine response: {response:?}");
        self.fail(
            ErrorKind::Internal,
            "The engine returned an unexpected response".to_string(),
            Effect::NothingChanged,
        );
    }

    fn transition(&mut self, next: LifecycleState) {
        log::debug!("Lifecycle {} -> {}", self.state.label(), next.label());
        self.state = next;
    }
}
