//! Theme name and asset path validation.
//!
//! Every theme name passes through [`ThemeNameValidator`] before it is joined
//! onto the install root, and every asset path in a package passes through
//! [`EntryPathValidator`] before anything is written. A value that fails
//! validation never reaches the filesystem.

use crate::common::{DecodeError, MAX_ENTRY_PATH_LEN, MAX_THEME_NAME_LEN, PathSafetyError};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Core validation trait shared by the engine validators.
///
/// # Examples
///
/// ```no_run
/// use engine::validation::{ThemeNameValidator, Validator};
///
/// let validator = ThemeNameValidator;
/// assert!(validator.validate("Nord Dark").is_ok());
/// assert!(validator.validate("../etc").is_err());
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// Validator for theme names used as directory names under the install root.
///
/// Display names may contain spaces and unicode; only what could change the
/// meaning of the joined path is rejected.
pub struct ThemeNameValidator;

impl Validator<str> for ThemeNameValidator {
    type Error = PathSafetyError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.trim().is_empty() {
            return Err(PathSafetyError::new(input, "Name cannot be empty"));
        }

        if input.len() > MAX_THEME_NAME_LEN {
            return Err(PathSafetyError::new(
                input,
                format!("Name too long (max {MAX_THEME_NAME_LEN} bytes)"),
            ));
        }

        if input == "." || input == ".." {
            return Err(PathSafetyError::new(
                input,
                "Name cannot refer to the current or parent directory",
            ));
        }

        if input.contains(['/', '\\']) {
            return Err(PathSafetyError::new(
                input,
                "Name cannot contain path separators",
            ));
        }

        if input.chars().any(char::is_control) {
            return Err(PathSafetyError::new(
                input,
                "Name cannot contain control characters",
            ));
        }

        // Dot-prefixed entries under the root are reserved for staging and trash
        if input.starts_with('.') {
            return Err(PathSafetyError::new(input, "Name cannot start with '.'"));
        }

        if input.trim() != input {
            return Err(PathSafetyError::new(
                input,
                "Name cannot start or end with whitespace",
            ));
        }

        Ok(())
    }
}

/// A theme name that has passed [`ThemeNameValidator`].
///
/// Holding a `ThemeName` is proof that joining it onto the install root
/// yields a direct child of the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeName(String);

impl ThemeName {
    pub fn parse(name: impl Into<String>) -> Result<Self, PathSafetyError> {
        let name = name.into();
        ThemeNameValidator.validate(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThemeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ThemeName {
    type Error = PathSafetyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Validator for asset paths stored inside a package.
pub struct EntryPathValidator;

impl Validator<str> for EntryPathValidator {
    type Error = DecodeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let reject = |reason: &str| DecodeError::UnsafeEntryPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(reject("path is empty"));
        }

        if input.len() > MAX_ENTRY_PATH_LEN {
            return Err(reject("path is too long"));
        }

        if input.contains('\0') {
            return Err(reject("path contains a NUL byte"));
        }

        // Packages are built on any platform; treat both separators alike
        if input.starts_with(['/', '\\']) {
            return Err(reject("path is absolute"));
        }

        let mut normal_components = 0;
        for part in input.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => return Err(reject("path escapes the theme directory")),
                _ if part.contains(':') => return Err(reject("path has a drive prefix")),
                _ => normal_components += 1,
            }
        }

        if normal_components == 0 {
            return Err(reject("path has no file name"));
        }

        for component in Path::new(input).components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(reject("path is not relative")),
            }
        }

        Ok(())
    }
}

/// Converts a validated entry path into a relative path with platform separators.
pub fn entry_relative_path(entry: &str) -> Result<PathBuf, DecodeError> {
    EntryPathValidator.validate(entry)?;
    Ok(entry
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect())
}
