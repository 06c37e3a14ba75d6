use super::lifecycle::SessionContext;
use crate::error::AppResult;
use engine::catalog::{CatalogClient, CatalogError, Report};
use std::sync::Arc;

/// Submits reports about malicious or broken catalog themes
pub struct ReportFlow {
    catalog: Arc<dyn CatalogClient>,
}

impl ReportFlow {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Sends a report as the session's user, or anonymously.
    ///
    /// A blank reason is rejected without contacting the catalog.
    pub async fn submit(
        &self,
        session: &SessionContext,
        theme_id: &str,
        reason: &str,
    ) -> AppResult<Report> {
        let report = Report::new(theme_id, session.identity(), reason).ok_or_else(|| {
            CatalogError::InvalidReport("please describe what is wrong with the theme".to_string())
        })?;

        self.catalog.create_report(&report).await?;
        log::info!(
            "Reported theme {} as {}",
            report.theme_id,
            report.reporter_id
        );
        Ok(report)
    }
}
