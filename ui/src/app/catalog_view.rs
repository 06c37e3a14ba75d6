//! Marketplace browsing and theme details.
//!
//! Both views decide between "Install" and "Apply" through one
//! [`InstallStateAccessor`], which asks the engine every time. Install state
//! can change between views, so nothing is cached.

use crate::error::{AppError, AppResult};
use engine::applier::Applied;
use engine::catalog::{CatalogClient, CatalogThemeRef};
use engine::installer::InstallReport;
use engine::theme_manager::{CommandExecutor, ThemeCommand, ThemeResponse};
use engine::verifier::InstallState;
use std::sync::Arc;

/// The one place views ask whether a theme is installed
#[derive(Clone)]
pub struct InstallStateAccessor {
    executor: Arc<dyn CommandExecutor>,
}

impl InstallStateAccessor {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    pub async fn state_of(&self, theme_name: &str) -> AppResult<InstallState> {
        let response = self
            .executor
            .execute(ThemeCommand::CheckInstalled {
                theme_name: theme_name.to_string(),
            })
            .await;

        match response {
            ThemeResponse::InstallState { state, .. } => Ok(state),
            ThemeResponse::Error { error } => Err(error.into()),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn action_for(&self, theme_name: &str) -> AppResult<ThemeAction> {
        Ok(if self.state_of(theme_name).await?.is_installed() {
            ThemeAction::Apply
        } else {
            ThemeAction::Install
        })
    }
}

/// The button a theme card or detail view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Install,
    Apply,
}

impl ThemeAction {
    pub fn label(&self) -> &'static str {
        match self {
            ThemeAction::Install => "Install",
            ThemeAction::Apply => "Apply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCard {
    pub theme: CatalogThemeRef,
    pub action: ThemeAction,
}

/// Result of pressing the detail view's button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Installed(InstallReport),
    Applied(Applied),
}

/// Catalog listing with per-theme install state
pub struct Marketplace {
    catalog: Arc<dyn CatalogClient>,
    executor: Arc<dyn CommandExecutor>,
    accessor: InstallStateAccessor,
}

impl Marketplace {
    pub fn new(catalog: Arc<dyn CatalogClient>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            catalog,
            accessor: InstallStateAccessor::new(executor.clone()),
            executor,
        }
    }

    pub fn accessor(&self) -> &InstallStateAccessor {
        &self.accessor
    }

    /// Themes matching `search`, each with its current action.
    pub async fn browse(&self, search: Option<&str>) -> AppResult<Vec<ThemeCard>> {
        let themes = self.catalog.list_themes().await?;
        log::debug!("Catalog listed {} theme(s)", themes.len());

        let mut cards = Vec::new();
        for theme in themes {
            if let Some(query) = search {
                if !theme.matches(query) {
                    continue;
                }
            }

            let action = match self.accessor.action_for(&theme.name).await {
                Ok(action) => action,
                Err(e) => {
                    log::warn!("Could not check '{}': {e}", theme.name);
                    ThemeAction::Install
                }
            };
            cards.push(ThemeCard { theme, action });
        }
        Ok(cards)
    }

    pub async fn details(&self, theme_id: &str, auto_apply: bool) -> AppResult<ThemeDetails> {
        let theme = self.catalog.get_theme(theme_id).await?;
        Ok(ThemeDetails::new(theme, self.executor.clone(), auto_apply))
    }
}

/// Detail view of one catalog theme
pub struct ThemeDetails {
    theme: CatalogThemeRef,
    executor: Arc<dyn CommandExecutor>,
    accessor: InstallStateAccessor,
    auto_apply: bool,
}

impl std::fmt::Debug for ThemeDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeDetails")
            .field("theme", &self.theme)
            .field("auto_apply", &self.auto_apply)
            .finish_non_exhaustive()
    }
}

impl ThemeDetails {
    pub fn new(
        theme: CatalogThemeRef,
        executor: Arc<dyn CommandExecutor>,
        auto_apply: bool,
    ) -> Self {
        Self {
            theme,
            accessor: InstallStateAccessor::new(executor.clone()),
            executor,
            auto_apply,
        }
    }

    pub fn theme(&self) -> &CatalogThemeRef {
        &self.theme
    }

    /// Re-checked on every call
    pub async fn action(&self) -> AppResult<ThemeAction> {
        self.accessor.action_for(&self.theme.name).await
    }

    /// Applies the theme when installed, installs it otherwise.
    pub async fn activate(&self) -> AppResult<ActionOutcome> {
        match self.action().await? {
            ThemeAction::Apply => self.apply().await.map(ActionOutcome::Applied),
            ThemeAction::Install => self.install().await.map(ActionOutcome::Installed),
        }
    }

    /// Downloads and installs the theme from the catalog.
    pub async fn install(&self) -> AppResult<InstallReport> {
        let response = self
            .executor
            .execute(ThemeCommand::DownloadTheme {
                theme_file_id: self.theme.file.clone(),
                theme_name: self.theme.name.clone(),
                auto_apply: self.auto_apply,
            })
            .await;

        match response {
            ThemeResponse::ThemeInstalled { report } => Ok(report),
            ThemeResponse::Error { error } => Err(error.into()),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn apply(&self) -> AppResult<Applied> {
        let response = self
            .executor
            .execute(ThemeCommand::ApplyTheme {
                theme_name: self.theme.name.clone(),
            })
            .await;

        match response {
            ThemeResponse::ThemeApplied { applied } => Ok(applied),
            ThemeResponse::Error { error } => Err(error.into()),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &ThemeResponse) -> AppError {
    log::error!("Unexpected engine response: {response:?}");
    AppError::State("The engine returned an unexpected response".to_string())
}
