//! Filesystem layout of the install root.
//!
//! ```text
//! <root>/
//!   <name> -> .reskin-store-<uuid>   installed theme record (unix)
//!   <name>/reskin.json               installed theme record (elsewhere)
//!   .reskin-store-<uuid>/reskin.json committed contents
//!   .reskin-store-<uuid>/...         assets
//!   .reskin-staging-<uuid>/          in-progress install
//!   .reskin-link-<uuid>              link about to replace `<name>`
//!   .reskin-trash-<uuid>/            previous version being replaced
//! ```
//!
//! Dot-prefixed entries are never theme records. On unix a reinstall renames
//! a fresh link over `<name>`, so readers see either the old or the new
//! version and never a missing one.

use crate::common::MANIFEST_FILE_NAME;
use crate::validation::ThemeName;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub(crate) const STAGING_PREFIX: &str = ".reskin-staging-";
pub(crate) const TRASH_PREFIX: &str = ".reskin-trash-";
pub(crate) const STORE_PREFIX: &str = ".reskin-store-";
pub(crate) const LINK_PREFIX: &str = ".reskin-link-";

/// The directory under which themes are installed, `~/.themes` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot {
    path: PathBuf,
}

impl InstallRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves a configured location, expanding a leading `~` to the home directory.
    pub fn from_location(location: &str) -> Self {
        Self::new(expand_home(location))
    }

    /// `~/.themes`, or `./.themes` when no home directory can be determined.
    pub fn default_location() -> Self {
        Self::from_location("~/.themes")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn theme_dir(&self, name: &ThemeName) -> PathBuf {
        self.path.join(name.as_str())
    }

    pub fn manifest_path(&self, name: &ThemeName) -> PathBuf {
        self.theme_dir(name).join(MANIFEST_FILE_NAME)
    }

    pub(crate) fn new_staging_dir(&self) -> PathBuf {
        self.path.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()))
    }

    pub(crate) fn new_trash_dir(&self) -> PathBuf {
        self.path.join(format!("{TRASH_PREFIX}{}", Uuid::new_v4()))
    }

    #[cfg(unix)]
    pub(crate) fn new_link_path(&self) -> PathBuf {
        self.path.join(format!("{LINK_PREFIX}{}", Uuid::new_v4()))
    }

    /// A fresh store name, relative to the root.
    #[cfg(unix)]
    pub(crate) fn new_store_name() -> String {
        format!("{STORE_PREFIX}{}", Uuid::new_v4())
    }

    /// Whether a link target names a store directly under the root.
    pub(crate) fn is_store(target: &str) -> bool {
        target.starts_with(STORE_PREFIX) && !target.contains('/')
    }

    /// Scratch entries an interrupted install can leave behind.
    pub(crate) fn is_leftover(file_name: &str) -> bool {
        [STAGING_PREFIX, TRASH_PREFIX, LINK_PREFIX, STORE_PREFIX]
            .iter()
            .any(|prefix| file_name.starts_with(prefix))
    }

    /// Creates the root if it does not exist yet.
    pub async fn ensure_exists(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.path).await
    }

    /// Names of the directories that look like theme records, sorted.
    ///
    /// Links are followed and dangling ones skipped. Only the layout is
    /// checked here; use the verifier to decide whether a directory holds a
    /// valid installation.
    pub async fn list_theme_dirs(&self) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => names.push(name),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Expands a leading `~` or `~/` using the user's home directory.
pub fn expand_home(location: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (location, home) {
        ("~", Some(home)) => home,
        (loc, Some(home)) if loc.starts_with("~/") => home.join(&loc[2..]),
        (loc, None) if loc.starts_with("~/") => PathBuf::from(&loc[2..]),
        (loc, _) => PathBuf::from(loc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let root = InstallRoot::new("/tmp/themes");
        let name = ThemeName::parse("Nord Dark").unwrap();

        assert_eq!(root.theme_dir(&name), PathBuf::from("/tmp/themes/Nord Dark"));
        assert_eq!(
            root.manifest_path(&name),
            PathBuf::from("/tmp/themes/Nord Dark/reskin.json")
        );
    }

    #[test]
    fn test_scratch_dirs_are_hidden_and_unique() {
        let root = InstallRoot::new("/tmp/themes");
        let a = root.new_staging_dir();
        let b = root.new_staging_dir();

        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with('.'));
        assert!(InstallRoot::is_leftover(name));
        assert!(!InstallRoot::is_leftover("Cool"));

        assert!(InstallRoot::is_leftover(".reskin-store-a"));
        assert!(InstallRoot::is_store(".reskin-store-a"));
        assert!(!InstallRoot::is_store(".reskin-store-a/../../etc"));
        assert!(!InstallRoot::is_store("/home/ada/themes/Cool"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/opt/themes"), PathBuf::from("/opt/themes"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.themes"), home.join(".themes"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[tokio::test]
    async fn test_list_theme_dirs_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = InstallRoot::new(dir.path());
        tokio::fs::create_dir(dir.path().join("Zed")).await.unwrap();
        tokio::fs::create_dir(dir.path().join("Alpha")).await.unwrap();
        tokio::fs::create_dir(dir.path().join(".reskin-staging-x")).await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "x").await.unwrap();

        assert_eq!(root.list_theme_dirs().await.unwrap(), vec!["Alpha", "Zed"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_theme_dirs_follows_links() {
        let dir = tempfile::tempdir().unwrap();
        let root = InstallRoot::new(dir.path());
        tokio::fs::create_dir(dir.path().join(".reskin-store-a")).await.unwrap();
        tokio::fs::symlink(".reskin-store-a", dir.path().join("Cool")).await.unwrap();
        tokio::fs::symlink(".reskin-store-gone", dir.path().join("Broken")).await.unwrap();

        assert_eq!(root.list_theme_dirs().await.unwrap(), vec!["Cool"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let root = InstallRoot::new(dir.path().join("nope"));

        assert!(root.list_theme_dirs().await.unwrap().is_empty());
    }
}
