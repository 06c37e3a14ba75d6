use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding a `.reskin` package.
///
/// Every variant is recoverable locally: the user can pick another file. A
/// decode error never carries a partially parsed manifest.
///
/// # Examples
///
/// ```no_run
/// use engine::common::DecodeError;
/// use engine::package::PackageDecoder;
/// # fn demo(bytes: Vec<u8>) {
///
/// match PackageDecoder::default().decode(&bytes) {
///     Ok(manifest) => println!("Previewing {}", manifest.name),
///     Err(DecodeError::TooLarge { size, limit }) => {
///         eprintln!("Package is {size} bytes, limit is {limit}");
///     }
///     Err(other) => eprintln!("Not a usable package: {other}"),
/// }
/// # }
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The package exceeds the configured maximum size.
    #[error("Package is {size} bytes, which exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The package ends before a complete header or entry.
    #[error("Invalid .reskin file: {0}")]
    Truncated(String),

    /// The package does not start with the `RSKN` magic bytes.
    #[error("Invalid .reskin file: missing RSKN header")]
    BadMagic,

    /// The declared manifest length does not fit in the package.
    #[error("Invalid .reskin file: manifest size mismatch (declared {declared}, available {available})")]
    ManifestSizeMismatch { declared: u64, available: usize },

    /// The declared manifest length exceeds the manifest bound.
    #[error("Manifest is {size} bytes, which exceeds the {limit} byte limit")]
    ManifestTooLarge { size: u64, limit: usize },

    /// The manifest is not valid JSON or has fields of the wrong type.
    #[error("Failed to parse manifest: {0}")]
    InvalidManifest(String),

    /// A required manifest field is absent (or blank, for `name`).
    #[error("Manifest is missing required field '{0}'")]
    MissingField(String),

    /// An asset entry header is inconsistent.
    #[error("Malformed asset entry: {0}")]
    MalformedEntry(String),

    /// An asset entry path would escape the theme directory.
    #[error("Asset path '{path}' is not allowed: {reason}")]
    UnsafeEntryPath { path: String, reason: String },

    /// The manifest names a different theme than the one being installed.
    #[error("Package contains theme '{found}' but '{expected}' was requested")]
    NameMismatch { expected: String, found: String },
}

/// A theme name that cannot be used to build a path under the install root.
///
/// Raised before any filesystem operation, so a rejected name never has a
/// partial effect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Theme name '{name}' is not allowed: {reason}")]
pub struct PathSafetyError {
    pub name: String,
    pub reason: String,
}

impl PathSafetyError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced by the installer.
///
/// An `InstallError` always means nothing changed on disk: a failed install
/// leaves the previous state of the theme directory in place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallError {
    /// The package failed re-validation at install time.
    #[error("Theme package rejected: {0}")]
    Decode(#[from] DecodeError),

    /// Disk, permission or layout failure.
    #[error("Failed to {operation} '{}': {reason}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        reason: String,
    },

    /// The theme name would escape the install root.
    #[error(transparent)]
    UnsafeName(#[from] PathSafetyError),

    /// Reserved for cross-process install protection.
    #[error("Install conflict: {0}")]
    Conflict(String),
}

impl InstallError {
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Errors produced by the applier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// The verifier does not report the theme as installed.
    #[error("Theme '{theme}' is not installed")]
    NotInstalled { theme: String },

    #[error(transparent)]
    UnsafeName(#[from] PathSafetyError),

    /// The environment-specific backend failed to activate the theme.
    #[error("Failed to apply theme '{theme}' with {backend}: {reason}")]
    Backend {
        theme: String,
        backend: String,
        reason: String,
    },
}

/// Errors from the hosted catalog and account backend.
///
/// These are surfaced as opaque status text; no retry is attempted here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Theme catalog is not configured: {0}")]
    NotConfigured(String),

    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),

    #[error("Downloaded package is larger than the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid report: {0}")]
    InvalidReport(String),
}

/// Coarse classification of a [`ThemeError`] for status rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decode,
    Io,
    PathSafety,
    Apply,
    Network,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Io => "io",
            ErrorKind::PathSafety => "path-safety",
            ErrorKind::Apply => "apply",
            ErrorKind::Network => "network",
            ErrorKind::Internal => "internal",
        };
        f.write_str(label)
    }
}

/// Error returned through the native command surface.
///
/// Wraps the component errors so callers can pattern-match on [`ErrorKind`]
/// and display the message verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),

    #[error(transparent)]
    Network(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThemeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThemeError::Decode(_) => ErrorKind::Decode,
            ThemeError::Install(InstallError::Decode(_)) => ErrorKind::Decode,
            ThemeError::Install(InstallError::UnsafeName(_)) => ErrorKind::PathSafety,
            ThemeError::Install(InstallError::Io { .. } | InstallError::Conflict(_)) => {
                ErrorKind::Io
            }
            ThemeError::Apply(ApplyError::UnsafeName(_)) => ErrorKind::PathSafety,
            ThemeError::Apply(_) => ErrorKind::Apply,
            ThemeError::PathSafety(_) => ErrorKind::PathSafety,
            ThemeError::Network(_) => ErrorKind::Network,
            ThemeError::Io(_) => ErrorKind::Io,
            ThemeError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type ThemeResult<T> = Result<T, ThemeError>;
