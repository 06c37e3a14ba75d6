//! Plain-text rendering of what the app shows.

use crate::app::{ThemeAction, ThemeCard};
use crate::app::lifecycle::{StatusKind, StatusLine};
use engine::catalog::CatalogThemeRef;
use engine::manifest::ThemeManifest;
use engine::recent::RecentTheme;

/// User-facing message produced by the error reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Info(text) => text.clone(),
        Notice::Warning(text) => format!("warning: {text}"),
        Notice::Error(text) => format!("error: {text}"),
    }
}

pub fn render_status(status: &StatusLine) -> String {
    match status.kind {
        StatusKind::Info => status.text.clone(),
        StatusKind::Success => format!("ok: {}", status.text),
        StatusKind::Error => format!("error: {}", status.text),
    }
}

/// The theme info preview shown before installing
pub fn render_manifest(manifest: &ThemeManifest) -> String {
    let mut lines = vec![
        format!("Name:        {}", manifest.name),
        format!("Author:      {}", manifest.author),
        format!("Description: {}", manifest.description),
        format!("Version:     {}", manifest.version),
        format!("Tags:        {}", manifest.tags_display()),
        format!("License:     {}", manifest.license),
    ];
    if let Some(preview) = &manifest.preview {
        lines.push(format!("Preview:     {preview}"));
    }
    lines.join("\n")
}

pub fn render_card(card: &ThemeCard) -> String {
    format!(
        "{:<8} {} by {}  [{}]",
        card.action.label(),
        card.theme.name,
        card.theme.author,
        card.theme.id
    )
}

pub fn render_details(theme: &CatalogThemeRef, action: ThemeAction) -> String {
    let mut lines = vec![
        format!("{} by {}", theme.name, theme.author),
        String::new(),
    ];
    if !theme.description.is_empty() {
        lines.push(theme.description.clone());
        lines.push(String::new());
    }
    if let Some(version) = &theme.version {
        lines.push(format!("Version: {version}"));
    }
    if !theme.tags.is_empty() {
        lines.push(format!("Tags:    {}", theme.tags.join(", ")));
    }
    if let Some(preview) = &theme.preview {
        lines.push(format!("Preview: {preview}"));
    }
    lines.push(format!("Action:  {}", action.label()));
    lines.join("\n")
}

pub fn render_recent(themes: &[RecentTheme]) -> String {
    if themes.is_empty() {
        return "No themes installed yet".to_string();
    }
    themes
        .iter()
        .map(|theme| {
            let when = chrono::DateTime::from_timestamp(theme.installed_at as i64, 0)
                .map(|t| {
                    t.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_default();
            format!("{when}  {} by {}", theme.name, theme.author)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
