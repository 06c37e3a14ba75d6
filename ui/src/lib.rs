//! # Reskin
//!
//! Command line front end for `.reskin` desktop theme packages. It previews,
//! installs and applies local packages, browses the hosted catalog, and
//! handles catalog accounts and theme reports.
//!
//! ## Modules
//!
//! - [`app`] - Install lifecycle, catalog views, reports and sign-in flows
//! - [`cli`] - Command line arguments
//! - [`config`] - Configuration loading, validation and first-run setup
//! - [`error`] - Error types and centralized error reporting
//! - [`logger`] - Logging setup
//! - [`validation`] - Input validation for account forms
//! - [`view`] - Plain-text rendering
//!
//! This library interface enables integration testing by providing access to internal modules.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod validation;
pub mod view;

pub use error::{AppError, AppResult};
pub use validation::Validator;
