//! # Catalog Module
//!
//! Client for the hosted theme catalog and its account backend.
//!
//! ## Core Components
//!
//! - [`CatalogClient`] - List and fetch themes, download packages, submit reports
//! - [`AccountService`] - Sign in, sign up, password recovery and sign out
//! - [`HttpCatalog`] - HTTP implementation of both traits
//!
//! The presentation layer depends on the traits only, so tests can swap in
//! in-memory implementations.
//!
//! ## Usage
//!
//! ```no_run
//! use engine::catalog::{CatalogClient, CatalogConfig, HttpCatalog};
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let catalog = HttpCatalog::new(CatalogConfig {
//!     endpoint: "https://cloud.example.com/v1".to_string(),
//!     ..CatalogConfig::default()
//! })?;
//! for theme in catalog.list_themes().await? {
//!     println!("{} by {}", theme.name, theme.author);
//! }
//! # Ok(())
//! # }
//! ```

pub use self::client::{AccountService, CatalogClient};
pub use self::http::HttpCatalog;
pub use self::types::{
    ANONYMOUS_REPORTER, CatalogThemeRef, Credentials, Identity, Report, Session, StoredSession,
};
pub use crate::common::CatalogError;

/// Client traits
pub mod client;
/// HTTP implementation
pub mod http;
/// Catalog and account data types
pub mod types;

use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the catalog lives and which collections to use.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
    pub themes_collection_id: String,
    pub reports_collection_id: String,
    pub files_bucket_id: String,
    pub request_timeout: Duration,
    /// Page the password recovery email links to.
    pub recovery_redirect_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            project_id: "reskin".to_string(),
            api_key: None,
            database_id: "reskin".to_string(),
            themes_collection_id: "themes".to_string(),
            reports_collection_id: "reports".to_string(),
            files_bucket_id: "themes".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            recovery_redirect_url: "https://reskin.app/set-new-password".to_string(),
        }
    }
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("database_id", &self.database_id)
            .field("themes_collection_id", &self.themes_collection_id)
            .field("reports_collection_id", &self.reports_collection_id)
            .field("files_bucket_id", &self.files_bucket_id)
            .field("request_timeout", &self.request_timeout)
            .field("recovery_redirect_url", &self.recovery_redirect_url)
            .finish()
    }
}
