//! # Reskin Engine Library
//!
//! Core library for the `.reskin` theme package lifecycle. This library decodes
//! packages, installs them atomically under the install root, verifies installed
//! state, applies installed themes, and talks to the hosted theme catalog.
//!
//! ## Modules
//!
//! - [`manifest`] - Theme manifest model and tag normalization
//! - [`package`] - `.reskin` container decoding and bundling
//! - [`install_root`] - Filesystem layout of the install root
//! - [`verifier`] - Installed-state verification
//! - [`installer`] - Atomic, per-name serialized installation
//! - [`applier`] - Theme activation and apply backends
//! - [`catalog`] - Hosted catalog, report and account client
//! - [`session`] - Persisted session store
//! - [`recent`] - Recently installed themes
//! - [`theme_manager`] - Native command surface used by the presentation layer
//! - [`validation`] - Theme name validation and path safety
//! - [`common`] - Common error types and limits

pub mod applier;
pub mod catalog;
pub mod common;
pub mod install_root;
pub mod installer;
pub mod manifest;
pub mod package;
pub mod recent;
pub mod session;
pub mod theme_manager;
pub mod validation;
pub mod verifier;

pub use manifest::ThemeManifest;
pub use validation::ThemeName;
