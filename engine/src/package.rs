//! # Package Module
//!
//! Reading and writing of the `.reskin` container.
//!
//! ## Format
//!
//! ```text
//! "RSKN" | u64 LE manifest_len | manifest JSON
//! then, until end of data, zero or more asset entries:
//! u32 LE path_len | path (UTF-8) | u64 LE data_len | data
//! ```
//!
//! ## Components
//!
//! - [`PackageDecoder`] - Side-effect free manifest extraction and full validation
//! - [`PackageBuilder`] - Bundles a manifest and assets into a package
//! - [`DecodedPackage`] / [`AssetEntry`] - A validated view over package bytes
//!
//! ## Usage
//!
//! ```no_run
//! use engine::package::PackageDecoder;
//! # fn demo(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//!
//! let decoder = PackageDecoder::default();
//!
//! // Preview only reads the header and manifest
//! let manifest = decoder.decode(&bytes)?;
//!
//! // Install-time validation walks every asset entry
//! let package = decoder.open(&bytes)?;
//! for entry in &package.entries {
//!     println!("{} ({} bytes)", entry.path, entry.data.len());
//! }
//! # Ok(())
//! # }
//! ```

pub use self::builder::PackageBuilder;
pub use self::decoder::PackageDecoder;
pub use self::format::{AssetEntry, DecodedPackage};

/// Bundling of directories into packages
pub mod builder;
/// Manifest extraction and package validation
pub mod decoder;
/// Binary layout primitives
pub mod format;
