use async_trait::async_trait;
use claims::*;
use engine::applier::StateFileBackend;
use engine::catalog::{CatalogClient, CatalogThemeRef, Identity, Report};
use engine::common::CatalogError;
use engine::install_root::InstallRoot;
use engine::installer::ApplyOutcome;
use engine::manifest::ThemeManifest;
use engine::package::PackageBuilder;
use engine::theme_manager::{
    CommandExecutor, ThemeCommand, ThemeManager, ThemeManagerConfig, ThemeResponse,
};
use reskin::app::{ActionOutcome, Marketplace, ReportFlow, SessionContext, ThemeAction};
use reskin::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// Helper module for catalog view testing
mod catalog_view_helpers {
    use super::*;

    pub fn theme(id: &str, name: &str, author: &str, tags: &[&str]) -> CatalogThemeRef {
        CatalogThemeRef {
            id: id.to_string(),
            name: name.to_string(),
            author: author.to_string(),
            description: format!("{name} for every desktop"),
            preview: None,
            file: format!("file-{id}"),
            version: Some("1.0".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn package(name: &str, author: &str) -> Vec<u8> {
        let manifest = ThemeManifest::from_json_slice(
            format!(r#"{{"name":"{name}","author":"{author}","version":"1.0","license":"MIT"}}"#)
                .as_bytes(),
        )
        .unwrap();
        let mut builder = PackageBuilder::new(manifest);
        builder
            .add_asset("gtk-3.0/gtk.css", b"window {}".to_vec())
            .unwrap();
        builder.build().unwrap()
    }

    /// In-memory catalog that records reports
    #[derive(Default)]
    pub struct FakeCatalog {
        pub themes: Vec<CatalogThemeRef>,
        pub files: HashMap<String, Vec<u8>>,
        pub reports: Mutex<Vec<Report>>,
    }

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn list_themes(&self) -> Result<Vec<CatalogThemeRef>, CatalogError> {
            Ok(self.themes.clone())
        }

        async fn get_theme(&self, theme_id: &str) -> Result<CatalogThemeRef, CatalogError> {
            self.themes
                .iter()
                .find(|t| t.id == theme_id)
                .cloned()
                .ok_or(CatalogError::Status {
                    status: 404,
                    body: "Document not found".to_string(),
                })
        }

        async fn download_package(
            &self,
            file_id: &str,
            _max_size: usize,
        ) -> Result<Vec<u8>, CatalogError> {
            self.files.get(file_id).cloned().ok_or(CatalogError::Status {
                status: 404,
                body: "File not found".to_string(),
            })
        }

        async fn create_report(&self, report: &Report) -> Result<(), CatalogError> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    /// Counts `CheckInstalled` calls on the way to the real manager
    pub struct CountingExecutor {
        pub inner: ThemeManager,
        pub checks: Mutex<usize>,
    }

    #[async_trait]
    impl CommandExecutor for CountingExecutor {
        async fn execute(&self, command: ThemeCommand) -> ThemeResponse {
            if let ThemeCommand::CheckInstalled { .. } = command {
                *self.checks.lock().unwrap() += 1;
            }
            self.inner.execute_command(command).await
        }
    }

    pub struct Harness {
        pub _dir: TempDir,
        pub catalog: Arc<FakeCatalog>,
        pub executor: Arc<CountingExecutor>,
    }

    impl Harness {
        pub fn marketplace(&self) -> Marketplace {
            Marketplace::new(self.catalog.clone(), self.executor.clone())
        }

        pub fn checks(&self) -> usize {
            *self.executor.checks.lock().unwrap()
        }
    }

    pub fn harness() -> Harness {
        let mut catalog = FakeCatalog {
            themes: vec![
                theme("t1", "Nord", "arctic", &["dark", "blue"]),
                theme("t2", "Solar", "ethan", &["light"]),
                theme("t3", "Dracula", "zeno", &["dark"]),
            ],
            ..Default::default()
        };
        catalog
            .files
            .insert("file-t1".to_string(), package("Nord", "arctic"));
        catalog
            .files
            .insert("file-t2".to_string(), package("Solar", "ethan"));
        catalog
            .files
            .insert("file-t3".to_string(), package("Impostor", "zeno"));
        let catalog = Arc::new(catalog);

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("themes");
        std::fs::create_dir_all(&root).unwrap();
        let config = ThemeManagerConfig::new(InstallRoot::new(root), dir.path());
        let backend = Arc::new(StateFileBackend::new(dir.path(), false));
        let client: Arc<dyn CatalogClient> = catalog.clone();
        let manager = ThemeManager::new(config, backend, Some(client));

        Harness {
            _dir: dir,
            catalog,
            executor: Arc::new(CountingExecutor {
                inner: manager,
                checks: Mutex::new(0),
            }),
        }
    }
}

use catalog_view_helpers::*;

mod browsing {
    use super::*;

    #[tokio::test]
    async fn test_browse_lists_everything_as_install() {
        let harness = harness();

        let cards = assert_ok!(harness.marketplace().browse(None).await);
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c.action == ThemeAction::Install));
        assert_eq!(harness.checks(), 3);
    }

    #[tokio::test]
    async fn test_browse_search() {
        let harness = harness();
        let marketplace = harness.marketplace();

        let dark = assert_ok!(marketplace.browse(Some("DARK")).await);
        let names: Vec<_> = dark.iter().map(|c| c.theme.name.as_str()).collect();
        assert_eq!(names, vec!["Nord", "Dracula"]);

        let by_author = assert_ok!(marketplace.browse(Some("ethan")).await);
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].theme.name, "Solar");

        assert!(assert_ok!(marketplace.browse(Some("nothing")).await).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_theme_details() {
        let harness = harness();

        let err = assert_err!(harness.marketplace().details("missing", false).await);
        assert!(matches!(
            err,
            AppError::Catalog(CatalogError::Status { status: 404, .. })
        ));
    }
}

mod install_state {
    use super::*;

    #[tokio::test]
    async fn test_action_flips_after_install() {
        let harness = harness();
        let marketplace = harness.marketplace();

        let details = assert_ok!(marketplace.details("t1", false).await);
        assert_eq!(assert_ok!(details.action().await), ThemeAction::Install);

        match assert_ok!(details.activate().await) {
            ActionOutcome::Installed(report) => assert_eq!(report.manifest.name, "Nord"),
            other => panic!("expected Installed, got {other:?}"),
        }

        // The same view re-queries instead of caching
        assert_eq!(assert_ok!(details.action().await), ThemeAction::Apply);

        // So does the listing
        let cards = assert_ok!(marketplace.browse(None).await);
        let nord = cards.iter().find(|c| c.theme.name == "Nord").unwrap();
        assert_eq!(nord.action, ThemeAction::Apply);
        let solar = cards.iter().find(|c| c.theme.name == "Solar").unwrap();
        assert_eq!(solar.action, ThemeAction::Install);

        match assert_ok!(details.activate().await) {
            ActionOutcome::Applied(applied) => assert_eq!(applied.theme, "Nord"),
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_view_asks_the_engine() {
        let harness = harness();
        let details = assert_ok!(harness.marketplace().details("t2", false).await);

        assert_ok!(details.action().await);
        assert_ok!(details.action().await);
        assert_ok!(harness.marketplace().accessor().action_for("Solar").await);
        assert_eq!(harness.checks(), 3);
    }

    #[tokio::test]
    async fn test_download_with_auto_apply() {
        let harness = harness();
        let details = assert_ok!(harness.marketplace().details("t2", true).await);

        let report = assert_ok!(details.install().await);
        assert_eq!(report.manifest.name, "Solar");
        assert!(matches!(report.apply, ApplyOutcome::Applied(_)));
    }

    #[tokio::test]
    async fn test_mismatched_package_is_not_installed() {
        let harness = harness();
        let details = assert_ok!(harness.marketplace().details("t3", false).await);

        let err = assert_err!(details.activate().await);
        assert!(matches!(err, AppError::Engine(_)));
        assert_eq!(assert_ok!(details.action().await), ThemeAction::Install);
    }
}

mod reporting {
    use super::*;

    #[tokio::test]
    async fn test_blank_reason_is_not_sent() {
        let harness = harness();
        let flow = ReportFlow::new(harness.catalog.clone());

        let err = assert_err!(flow.submit(&SessionContext::anonymous(), "t1", "   ").await);
        assert!(matches!(
            err,
            AppError::Catalog(CatalogError::InvalidReport(_))
        ));
        assert!(harness.catalog.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_identity() {
        let harness = harness();
        let flow = ReportFlow::new(harness.catalog.clone());

        let report = assert_ok!(
            flow.submit(&SessionContext::anonymous(), "t1", "Replaces my shell config")
                .await
        );
        assert_eq!(report.reporter_id, "anonymous");

        let session = SessionContext::signed_in(Identity {
            id: "user-42".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        });
        let report = assert_ok!(flow.submit(&session, "t2", "  broken icons ").await);
        assert_eq!(report.reporter_id, "user-42");
        assert_eq!(report.reason, "broken icons");

        let reports = harness.catalog.reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].theme_id, "t2");
    }
}
