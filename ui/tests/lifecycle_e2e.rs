use async_trait::async_trait;
use claims::*;
use engine::applier::{ApplyBackend, BackendError, StateFileBackend};
use engine::catalog::CatalogThemeRef;
use engine::common::ErrorKind;
use engine::install_root::InstallRoot;
use engine::manifest::ThemeManifest;
use engine::package::PackageBuilder;
use engine::theme_manager::{
    CommandExecutor, ThemeCommand, ThemeManager, ThemeManagerConfig, ThemeResponse,
};
use engine::ThemeName;
use reskin::app::{
    Effect, InstallStateAccessor, LifecycleController, LifecycleState, SessionContext, StatusKind,
    ThemeAction, ThemeDetails,
};
use reskin::AppError;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// Helper module for driving the lifecycle against a real engine
mod lifecycle_helpers {
    use super::*;

    pub fn cool_manifest() -> ThemeManifest {
        ThemeManifest::from_json_slice(
            br#"{"name":"Cool","author":"Ada","version":"1.0","tags":["dark"],"license":"MIT"}"#,
        )
        .unwrap()
    }

    pub fn cool_package() -> Vec<u8> {
        let mut builder = PackageBuilder::new(cool_manifest());
        builder
            .add_asset("gtk-3.0/gtk.css", b"window { background: #000; }".to_vec())
            .unwrap();
        builder.build().unwrap()
    }

    /// Wraps the real manager and records the name of every command
    pub struct RecordingExecutor {
        pub inner: ThemeManager,
        pub commands: Mutex<Vec<&'static str>>,
    }

    impl RecordingExecutor {
        pub fn commands(&self) -> Vec<&'static str> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(&self, command: ThemeCommand) -> ThemeResponse {
            self.commands.lock().unwrap().push(command.name());
            self.inner.execute_command(command).await
        }
    }

    /// A backend whose activation always fails
    pub struct BrokenBackend;

    #[async_trait]
    impl ApplyBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        async fn active_theme(&self) -> Result<Option<String>, BackendError> {
            Ok(None)
        }

        async fn activate(
            &self,
            _theme: &ThemeName,
            _theme_dir: &Path,
        ) -> Result<(), BackendError> {
            Err(BackendError::new("settings daemon is not running"))
        }
    }

    pub struct Harness {
        pub dir: TempDir,
        pub executor: Arc<RecordingExecutor>,
    }

    impl Harness {
        pub fn root(&self) -> std::path::PathBuf {
            self.dir.path().join("themes")
        }

        pub fn controller(&self) -> LifecycleController {
            LifecycleController::new(self.executor.clone(), SessionContext::anonymous())
        }

        pub fn accessor(&self) -> InstallStateAccessor {
            InstallStateAccessor::new(self.executor.clone())
        }
    }

    pub fn harness_with(
        backend: Option<Arc<dyn ApplyBackend>>,
        max_package_size: Option<usize>,
    ) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        std::fs::create_dir_all(&state_dir).unwrap();
        let root = InstallRoot::new(dir.path().join("themes"));
        std::fs::create_dir_all(root.path()).unwrap();

        let mut config = ThemeManagerConfig::new(root, &state_dir);
        if let Some(limit) = max_package_size {
            config.max_package_size = limit;
        }
        let backend =
            backend.unwrap_or_else(|| Arc::new(StateFileBackend::new(&state_dir, false)));

        Harness {
            dir,
            executor: Arc::new(RecordingExecutor {
                inner: ThemeManager::new(config, backend, None),
                commands: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn harness() -> Harness {
        harness_with(None, None)
    }
}

use lifecycle_helpers::*;

mod install_flow {
    use super::*;

    #[tokio::test]
    async fn test_preview_then_install_without_apply() {
        let harness = harness();
        let mut controller = harness.controller();

        let state = assert_ok!(
            controller
                .select_file("cool-theme.reskin", cool_package())
                .await
        );
        let manifest = assert_some!(state.manifest()).clone();
        assert_eq!(state.label(), "previewing");
        assert_eq!(manifest.name, "Cool");
        assert_eq!(manifest.author, "Ada");
        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.tags, vec!["dark"]);
        assert_eq!(manifest.license, "MIT");

        // Previewing has no side effects on disk
        assert!(!harness.root().join("Cool").exists());

        let state = assert_ok!(controller.confirm_install(false).await);
        assert!(matches!(state, LifecycleState::Installed { .. }));
        assert_eq!(controller.status().kind, StatusKind::Success);
        assert!(harness.root().join("Cool").is_dir());

        let installed = assert_ok!(harness.accessor().state_of("Cool").await);
        assert!(installed.is_installed());

        // The catalog detail view now offers Apply
        let theme = CatalogThemeRef {
            id: "t1".to_string(),
            name: "Cool".to_string(),
            author: "Ada".to_string(),
            description: String::new(),
            preview: None,
            file: "f1".to_string(),
            version: Some("1.0".to_string()),
            tags: vec!["dark".to_string()],
        };
        let details = ThemeDetails::new(theme, harness.executor.clone(), false);
        assert_eq!(assert_ok!(details.action().await), ThemeAction::Apply);

        assert_eq!(
            harness.executor.commands(),
            vec![
                "extract_theme_info",
                "install_theme_from_data",
                "check_installed",
                "check_installed",
            ]
        );
    }

    #[tokio::test]
    async fn test_install_with_auto_apply() {
        let harness = harness();
        let mut controller = harness.controller();

        assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        let state = assert_ok!(controller.confirm_install(true).await);

        match state {
            LifecycleState::Applied { manifest, applied } => {
                assert_eq!(manifest.name, "Cool");
                assert_eq!(applied.theme, "Cool");
                assert!(!applied.already_active);
            }
            other => panic!("expected Applied, got {other:?}"),
        }
        assert!(assert_ok!(harness.accessor().state_of("Cool").await).is_installed());
    }

    #[tokio::test]
    async fn test_apply_after_install() {
        let harness = harness();
        let mut controller = harness.controller();

        assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        assert_ok!(controller.confirm_install(false).await);
        let state = assert_ok!(controller.apply().await);
        assert_eq!(state.label(), "applied");

        // A finished flow starts over on the next selection
        let state = assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        assert_eq!(state.label(), "previewing");
    }

    #[tokio::test]
    async fn test_select_from_disk() {
        let harness = harness();
        let path = harness.dir.path().join("cool.reskin");
        std::fs::write(&path, cool_package()).unwrap();

        let mut controller = harness.controller();
        let state = assert_ok!(controller.select_path(&path).await);
        assert_eq!(state.label(), "previewing");
        assert_eq!(assert_some!(controller.package()).file_name, "cool.reskin");
    }
}

mod rejected_input {
    use super::*;

    #[tokio::test]
    async fn test_wrong_extension_makes_no_engine_call() {
        let harness = harness();
        let mut controller = harness.controller();

        let state = assert_ok!(controller.select_file("cool-theme.zip", cool_package()).await);
        assert_eq!(state, &LifecycleState::Idle);
        assert_eq!(controller.status().kind, StatusKind::Error);
        assert!(controller.status().text.contains(".reskin"));
        assert!(harness.executor.commands().is_empty());

        let missing = harness.dir.path().join("notes.txt");
        assert_ok!(controller.select_path(&missing).await);
        assert!(harness.executor.commands().is_empty());
    }

    #[tokio::test]
    async fn test_oversize_package_is_a_decode_error() {
        let harness = harness_with(None, Some(64));
        let mut controller = harness.controller();

        let state = assert_ok!(controller.select_file("big.reskin", vec![0u8; 65]).await);
        match state {
            LifecycleState::Error { kind, effect, .. } => {
                assert_eq!(*kind, ErrorKind::Decode);
                assert_eq!(*effect, Effect::NothingChanged);
            }
            other => panic!("expected Error, got {other:?}"),
        }
        assert_none!(controller.state().manifest());
        assert_none!(controller.package());
    }

    #[tokio::test]
    async fn test_garbage_bytes_do_not_install() {
        let harness = harness();
        let mut controller = harness.controller();

        let junk = b"not a package".to_vec();
        let state = assert_ok!(controller.select_file("junk.reskin", junk).await);
        assert_eq!(state.label(), "error");
        assert_err!(controller.confirm_install(false).await);
        assert_eq!(harness.executor.commands(), vec!["extract_theme_info"]);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_io_error() {
        let harness = harness();
        let mut controller = harness.controller();

        let missing = harness.dir.path().join("gone.reskin");
        let state = assert_ok!(controller.select_path(&missing).await);
        assert!(matches!(
            state,
            LifecycleState::Error {
                kind: ErrorKind::Io,
                ..
            }
        ));
        assert!(harness.executor.commands().is_empty());
    }
}

mod state_rules {
    use super::*;

    #[tokio::test]
    async fn test_cancel_discards_preview() {
        let harness = harness();
        let mut controller = harness.controller();

        assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        assert_ok!(controller.cancel());
        assert_eq!(controller.state(), &LifecycleState::Idle);
        assert_none!(controller.package());
        assert!(!harness.root().join("Cool").exists());

        let err = assert_err!(controller.confirm_install(false).await);
        assert!(matches!(err, AppError::State(_)));
    }

    #[tokio::test]
    async fn test_error_must_be_acknowledged() {
        let harness = harness();
        let mut controller = harness.controller();

        assert_ok!(controller.select_file("junk.reskin", vec![1, 2, 3]).await);
        assert_err!(controller.select_file("cool.reskin", cool_package()).await);
        assert_err!(controller.cancel());

        controller.acknowledge();
        assert_eq!(controller.state(), &LifecycleState::Idle);
        let state = assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        assert_eq!(state.label(), "previewing");
    }

    #[tokio::test]
    async fn test_apply_requires_install() {
        let harness = harness();
        let mut controller = harness.controller();

        assert_err!(controller.apply().await);
        assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        assert_err!(controller.apply().await);
        assert_eq!(harness.executor.commands(), vec!["extract_theme_info"]);
    }

    #[tokio::test]
    async fn test_failed_apply_keeps_install() {
        let harness = harness_with(Some(Arc::new(BrokenBackend)), None);
        let mut controller = harness.controller();

        assert_ok!(controller.select_file("cool.reskin", cool_package()).await);
        let state = assert_ok!(controller.confirm_install(true).await);
        match state {
            LifecycleState::Error {
                kind,
                message,
                effect,
            } => {
                assert_eq!(*kind, ErrorKind::Apply);
                assert_eq!(*effect, Effect::InstalledNotApplied);
                assert!(message.contains("settings daemon is not running"));
            }
            other => panic!("expected Error, got {other:?}"),
        }

        assert!(assert_ok!(harness.accessor().state_of("Cool").await).is_installed());
    }
}
