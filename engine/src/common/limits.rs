//! Format constants and resource bounds shared by the decoder, installer and verifier.

/// Magic bytes at the start of every `.reskin` package.
pub const PACKAGE_MAGIC: &[u8; 4] = b"RSKN";

/// File extension that gates package selection (without the dot).
pub const PACKAGE_EXTENSION: &str = "reskin";

/// Name of the manifest file inside every installed theme directory.
pub const MANIFEST_FILE_NAME: &str = "reskin.json";

/// Default upper bound for a package accepted by the decoder (100 MiB).
pub const DEFAULT_MAX_PACKAGE_SIZE: usize = 100 * 1024 * 1024;

/// Upper bound for the embedded manifest, and for `reskin.json` on disk.
pub const MAX_MANIFEST_SIZE: usize = 1024 * 1024;

/// Upper bound for a single asset path inside a package.
pub const MAX_ENTRY_PATH_LEN: usize = 4096;

/// Upper bound for a theme name, in bytes.
pub const MAX_THEME_NAME_LEN: usize = 128;

/// Size of the fixed header: magic plus the u64 manifest length.
pub(crate) const HEADER_LEN: usize = PACKAGE_MAGIC.len() + 8;
