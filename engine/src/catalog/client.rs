use super::types::{CatalogThemeRef, Credentials, Identity, Report, Session};
use crate::common::CatalogError;
use async_trait::async_trait;

/// Read access to the hosted theme catalog, plus report submission.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_themes(&self) -> Result<Vec<CatalogThemeRef>, CatalogError>;

    async fn get_theme(&self, theme_id: &str) -> Result<CatalogThemeRef, CatalogError>;

    /// Downloads a package file, failing once it exceeds `max_size` bytes.
    async fn download_package(
        &self,
        file_id: &str,
        max_size: usize,
    ) -> Result<Vec<u8>, CatalogError>;

    async fn create_report(&self, report: &Report) -> Result<(), CatalogError>;
}

/// The account calls of the authentication backend.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_session(&self, credentials: &Credentials) -> Result<Session, CatalogError>;

    async fn current_user(&self, session: &Session) -> Result<Identity, CatalogError>;

    async fn create_account(
        &self,
        name: Option<&str>,
        credentials: &Credentials,
    ) -> Result<Identity, CatalogError>;

    async fn request_recovery(&self, email: &str) -> Result<(), CatalogError>;

    async fn delete_session(&self, session: &Session) -> Result<(), CatalogError>;
}
