use super::backend::{ApplyBackend, BackendError};
use crate::validation::ThemeName;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Applies themes by running an external program.
///
/// Arguments may contain `{theme}` and `{path}` placeholders, replaced by the
/// theme name and its installed directory. For GNOME:
///
/// ```text
/// command = ["gsettings", "set", "org.gnome.desktop.interface", "gtk-theme", "{theme}"]
/// query   = ["gsettings", "get", "org.gnome.desktop.interface", "gtk-theme"]
/// ```
///
/// The program is spawned directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBackend {
    apply: Vec<String>,
    query: Option<Vec<String>>,
}

impl CommandBackend {
    /// Returns `None` when `apply` has no program.
    pub fn new(apply: Vec<String>, query: Option<Vec<String>>) -> Option<Self> {
        if apply.first().is_none_or(|program| program.trim().is_empty()) {
            return None;
        }
        let query = query.filter(|q| q.first().is_some_and(|p| !p.trim().is_empty()));
        Some(Self { apply, query })
    }

    fn render(&self, theme: &ThemeName, theme_dir: &Path) -> Vec<String> {
        let path = theme_dir.to_string_lossy();
        self.apply
            .iter()
            .map(|arg| arg.replace("{theme}", theme.as_str()).replace("{path}", &path))
            .collect()
    }
}

async fn run(argv: &[String]) -> Result<String, BackendError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| BackendError::new("No program configured"))?;

    log::debug!("Running {program} {args:?}");
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| BackendError::new(format!("Failed to run '{program}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BackendError::new(format!(
            "'{program}' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `gsettings` prints strings quoted, e.g. `'Adwaita'`.
fn parse_query_output(stdout: &str) -> Option<String> {
    let value = stdout.trim().trim_matches(['\'', '"']).trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[async_trait]
impl ApplyBackend for CommandBackend {
    fn name(&self) -> &str {
        "command"
    }

    async fn active_theme(&self) -> Result<Option<String>, BackendError> {
        match &self.query {
            Some(query) => Ok(parse_query_output(&run(query).await?)),
            None => Ok(None),
        }
    }

    async fn activate(&self, theme: &ThemeName, theme_dir: &Path) -> Result<(), BackendError> {
        run(&self.render(theme, theme_dir)).await.map(|_| ())
    }
}
