use super::CatalogConfig;
use super::client::{AccountService, CatalogClient};
use super::types::{CatalogThemeRef, Credentials, DocumentList, Identity, Report, Session};
use crate::common::CatalogError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Catalog and account client for a document-database REST backend.
///
/// Document and storage calls carry the project id and, when configured, the
/// API key. Account calls carry the project id and the session secret.
/// Requests are never retried.
#[derive(Debug)]
pub struct HttpCatalog {
    config: CatalogConfig,
    http_client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        if config.endpoint.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "catalog.endpoint is not set".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                CatalogError::NotConfigured(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn documents_url(&self, collection_id: &str) -> String {
        self.url(&format!(
            "databases/{}/collections/{}/documents",
            urlencoding::encode(&self.config.database_id),
            urlencoding::encode(collection_id)
        ))
    }

    /// Request carrying the project id and API key.
    fn catalog_request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header(PROJECT_HEADER, &self.config.project_id);
        match &self.config.api_key {
            Some(key) if !key.is_empty() => request.header(KEY_HEADER, key.as_str()),
            _ => request,
        }
    }

    /// Request carrying the project id and, optionally, a session.
    fn account_request(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
    ) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, self.url(path))
            .header(PROJECT_HEADER, &self.config.project_id);
        match session {
            Some(session) if !session.secret.is_empty() => {
                request.header(SESSION_HEADER, session.secret.as_str())
            }
            _ => request,
        }
    }
}

async fn send(request: RequestBuilder) -> Result<Response, CatalogError> {
    let (client, request) = request.build_split();
    let request = request.map_err(|e| CatalogError::RequestFailed {
        url: String::new(),
        reason: e.to_string(),
    })?;
    let url = request.url().to_string();
    log::debug!("{} {}", request.method(), url);

    let response = client
        .execute(request)
        .await
        .map_err(|e| CatalogError::RequestFailed {
            url: url.clone(),
            reason: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
        })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        log::warn!("{url} returned status {status}");
        return Err(CatalogError::Status { status, body });
    }

    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    let text = response
        .text()
        .await
        .map_err(|e| CatalogError::InvalidResponse(format!("Failed to read response: {e}")))?;
    serde_json::from_str(&text)
        .map_err(|e| CatalogError::InvalidResponse(format!("Failed to parse JSON: {e}")))
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    async fn list_themes(&self) -> Result<Vec<CatalogThemeRef>, CatalogError> {
        let url = self.documents_url(&self.config.themes_collection_id);
        let response = send(self.catalog_request(Method::GET, &url)).await?;
        let list: DocumentList<CatalogThemeRef> = read_json(response).await?;
        log::debug!(
            "Catalog returned {} of {} theme(s)",
            list.documents.len(),
            list.total
        );
        Ok(list.documents)
    }

    async fn get_theme(&self, theme_id: &str) -> Result<CatalogThemeRef, CatalogError> {
        let url = format!(
            "{}/{}",
            self.documents_url(&self.config.themes_collection_id),
            urlencoding::encode(theme_id)
        );
        let response = send(self.catalog_request(Method::GET, &url)).await?;
        read_json(response).await
    }

    async fn download_package(
        &self,
        file_id: &str,
        max_size: usize,
    ) -> Result<Vec<u8>, CatalogError> {
        let url = self.url(&format!(
            "storage/buckets/{}/files/{}/download",
            urlencoding::encode(&self.config.files_bucket_id),
            urlencoding::encode(file_id)
        ));
        let mut response = send(self.catalog_request(Method::GET, &url)).await?;

        if response
            .content_length()
            .is_some_and(|len| len > max_size as u64)
        {
            return Err(CatalogError::PayloadTooLarge { limit: max_size });
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CatalogError::RequestFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?
        {
            if bytes.len() + chunk.len() > max_size {
                return Err(CatalogError::PayloadTooLarge { limit: max_size });
            }
            bytes.extend_from_slice(&chunk);
        }

        log::info!("Downloaded {} bytes for file {file_id}", bytes.len());
        Ok(bytes)
    }

    async fn create_report(&self, report: &Report) -> Result<(), CatalogError> {
        if report.reason.trim().is_empty() {
            return Err(CatalogError::InvalidReport(
                "a reason is required".to_string(),
            ));
        }

        let url = self.documents_url(&self.config.reports_collection_id);
        let body = json!({
            "documentId": uuid::Uuid::new_v4().simple().to_string(),
            "data": report,
        });
        send(self.catalog_request(Method::POST, &url).json(&body)).await?;
        log::info!("Submitted report for theme {}", report.theme_id);
        Ok(())
    }
}

#[async_trait]
impl AccountService for HttpCatalog {
    async fn create_session(&self, credentials: &Credentials) -> Result<Session, CatalogError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.as_str(),
        });
        let response =
            send(self.account_request(Method::POST, "account/sessions/email", None).json(&body))
                .await?;
        read_json(response).await
    }

    async fn current_user(&self, session: &Session) -> Result<Identity, CatalogError> {
        let response = send(self.account_request(Method::GET, "account", Some(session))).await?;
        read_json(response).await
    }

    async fn create_account(
        &self,
        name: Option<&str>,
        credentials: &Credentials,
    ) -> Result<Identity, CatalogError> {
        let mut body = json!({
            "userId": uuid::Uuid::new_v4().simple().to_string(),
            "email": credentials.email,
            "password": credentials.password.as_str(),
        });
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            body["name"] = json!(name);
        }
        let response = send(self.account_request(Method::POST, "account", None).json(&body)).await?;
        read_json(response).await
    }

    async fn request_recovery(&self, email: &str) -> Result<(), CatalogError> {
        let body = json!({
            "email": email,
            "url": self.config.recovery_redirect_url,
        });
        send(self.account_request(Method::POST, "account/recovery", None).json(&body)).await?;
        Ok(())
    }

    async fn delete_session(&self, session: &Session) -> Result<(), CatalogError> {
        let path = format!("account/sessions/{}", urlencoding::encode(&session.id));
        send(self.account_request(Method::DELETE, &path, Some(session))).await?;
        Ok(())
    }
}
