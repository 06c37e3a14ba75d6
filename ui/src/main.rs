use anyhow::{Context, Result};
use clap::Parser;
use engine::catalog::HttpCatalog;
use engine::manifest::ThemeManifest;
use engine::session::SessionStore;
use engine::theme_manager::{CommandExecutor, ThemeCommand, ThemeManager, ThemeResponse};
use reskin::app::bootstrap;
use reskin::app::{
    ActionOutcome, AuthFlow, LifecycleController, LifecycleState, Marketplace, ReportFlow,
    SessionContext, StatusKind,
};
use reskin::cli::{BundleArgs, Cli, Command, ConfigCommand};
use reskin::config::{self, AppConfig, setup};
use reskin::error::{AppError, ErrorReporter};
use reskin::logger;
use reskin::view::{self, Notice};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (tx, rx) = mpsc::channel::<Notice>();
    let reporter = ErrorReporter::new(tx);

    let config_dir = setup::get_config_dir().ok();

    // Config init must work before any config exists
    if let Command::Config(ConfigCommand::Init) = cli.command {
        let dir = config_dir.context("Unable to determine the config directory")?;
        let path = setup::initialize_config_dir(&dir)?;
        println!("Config file: {}", path.display());
        return Ok(());
    }

    let config = match config::init_config(cli.config.as_deref()).as_result() {
        Ok(config) => config,
        Err(message) => {
            reporter.report_critical(
                AppError::Config(message),
                "Config",
                "Configuration could not be loaded",
            );
            print_notices(&rx);
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::setup_logger(config.logging(), config_dir.as_deref(), cli.verbose) {
        reporter.report_warning(
            AppError::Io(format!("Logger setup failed: {e}")),
            "Logger",
            "setup",
        );
    }

    let state_dir = match &config_dir {
        Some(dir) => dir.clone(),
        None => std::env::temp_dir().join("reskin"),
    };

    let result = run(cli.command, config, &state_dir).await;

    if let Err(error) = &result {
        reporter.report_simple(error.clone(), "reskin", "command");
    }
    print_notices(&rx);

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &AppConfig, state_dir: &Path) -> Result<(), AppError> {
    let catalog = bootstrap::catalog_client(config)?;
    let manager = Arc::new(bootstrap::build_manager(config, state_dir, catalog.clone()).await?);
    let executor: Arc<dyn CommandExecutor> = manager.clone();
    let store = SessionStore::new(state_dir);

    match command {
        Command::Preview { file } => {
            let mut controller = LifecycleController::new(executor, SessionContext::anonymous());
            if let Some(manifest) = controller.select_path(&file).await?.manifest() {
                println!("{}\n", view::render_manifest(manifest));
            }
            finish(&controller)
        }
        Command::Install { file, apply } => {
            let session = AuthFlow::restore(&store).await;
            let mut controller = LifecycleController::new(executor, session);
            if let Some(manifest) = controller.select_path(&file).await?.manifest() {
                println!("{}\n", view::render_manifest(manifest));
            }
            if let LifecycleState::Previewing { .. } = controller.state() {
                controller
                    .confirm_install(apply.resolve(config.auto_apply()))
                    .await?;
            }
            finish(&controller)
        }
        Command::Apply { name } => {
            let response = manager
                .execute_command(ThemeCommand::ApplyTheme { theme_name: name })
                .await
                .into_result()?;
            if let ThemeResponse::ThemeApplied { applied } = response {
                if applied.already_active {
                    println!("'{}' is already active", applied.theme);
                } else {
                    println!("Applied '{}'", applied.theme);
                }
            }
            Ok(())
        }
        Command::Status { name } => {
            let accessor = reskin::app::InstallStateAccessor::new(executor);
            match accessor.state_of(&name).await?.manifest() {
                Some(manifest) => {
                    println!("'{name}' is installed\n\n{}", view::render_manifest(manifest))
                }
                None => println!("'{name}' is not installed"),
            }
            Ok(())
        }
        Command::Browse { search } => {
            let marketplace = Marketplace::new(require_catalog(&catalog)?, executor);
            let cards = marketplace.browse(search.as_deref()).await?;
            if cards.is_empty() {
                println!("No themes found");
            }
            for card in &cards {
                println!("{}", view::render_card(card));
            }
            Ok(())
        }
        Command::Details { theme_id } => {
            let marketplace = Marketplace::new(require_catalog(&catalog)?, executor);
            let details = marketplace.details(&theme_id, config.auto_apply()).await?;
            let action = details.action().await?;
            println!("{}", view::render_details(details.theme(), action));
            Ok(())
        }
        Command::Download { theme_id, apply } => {
            let marketplace = Marketplace::new(require_catalog(&catalog)?, executor);
            let details = marketplace
                .details(&theme_id, apply.resolve(config.auto_apply()))
                .await?;
            match details.activate().await? {
                ActionOutcome::Installed(report) => {
                    println!(
                        "Installed '{}' to {}",
                        report.manifest.name,
                        report.location.display()
                    );
                    if let engine::installer::ApplyOutcome::Failed(e) = report.apply {
                        println!("The theme could not be applied: {e}");
                    }
                }
                ActionOutcome::Applied(applied) => println!("Applied '{}'", applied.theme),
            }
            Ok(())
        }
        Command::Report { theme_id, reason } => {
            let session = AuthFlow::restore(&store).await;
            let flow = ReportFlow::new(require_catalog(&catalog)?);
            flow.submit(&session, &theme_id, &reason).await?;
            println!("Report submitted. Thank you!");
            Ok(())
        }
        Command::Login { email } => {
            let flow = AuthFlow::new(require_catalog(&catalog)?, store);
            let password = read_password()?;
            let session = flow.sign_in(&email, &password).await?;
            println!("Signed in as {}", session.display_name());
            Ok(())
        }
        Command::Signup { email, name } => {
            let flow = AuthFlow::new(require_catalog(&catalog)?, store);
            let password = read_password()?;
            let session = flow.sign_up(name.as_deref(), &email, &password).await?;
            println!("Account created. Signed in as {}", session.display_name());
            Ok(())
        }
        Command::Recover { email } => {
            let flow = AuthFlow::new(require_catalog(&catalog)?, store);
            flow.request_recovery(&email).await?;
            println!("If an account exists for {email}, a recovery email is on its way");
            Ok(())
        }
        Command::Logout => {
            match &catalog {
                Some(catalog) => {
                    AuthFlow::new(catalog.clone(), store).sign_out().await?;
                }
                None => store
                    .clear()
                    .await
                    .map_err(|e| AppError::Io(format!("Failed to remove the saved session: {e}")))?,
            }
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let session = AuthFlow::restore(&store).await;
            println!("{}", session.display_name());
            Ok(())
        }
        Command::Recent => {
            let response = manager
                .execute_command(ThemeCommand::GetRecentThemes)
                .await
                .into_result()?;
            if let ThemeResponse::RecentThemes { themes } = response {
                println!("{}", view::render_recent(&themes));
            }
            Ok(())
        }
        Command::Bundle(args) => bundle(&manager, args).await,
        Command::Version => {
            let response = manager
                .execute_command(ThemeCommand::GetAppVersion)
                .await
                .into_result()?;
            if let ThemeResponse::AppVersion { version } = response {
                println!("reskin {version}");
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .map_err(|e| AppError::Config(format!("Failed to render config: {e}")))?;
            println!("{rendered}");
            Ok(())
        }
        Command::Config(ConfigCommand::Init) => Ok(()),
    }
}

async fn bundle(manager: &ThemeManager, args: BundleArgs) -> Result<(), AppError> {
    let manifest = bundle_manifest(&args).await?;
    let response = manager
        .execute_command(ThemeCommand::BundleTheme {
            theme_directory: args.directory,
            manifest,
            output_path: args.output,
        })
        .await
        .into_result()?;
    if let ThemeResponse::ThemeBundled { output_path, size } = response {
        println!("Created {} ({size} bytes)", output_path.display());
    }
    Ok(())
}

/// Manifest from the command line, or the directory's reskin.json
async fn bundle_manifest(args: &BundleArgs) -> Result<ThemeManifest, AppError> {
    let json = match &args.name {
        Some(name) => serde_json::to_vec(&serde_json::json!({
            "name": name,
            "author": args.author,
            "description": args.description,
            "version": args.theme_version,
            "license": args.license,
            "tags": args.tags,
            "preview": args.preview,
        }))
        .map_err(|e| AppError::Io(e.to_string()))?,
        None => {
            let path: PathBuf = args.directory.join(engine::common::MANIFEST_FILE_NAME);
            tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::Io(format!("Failed to read {}: {e}", path.display())))?
        }
    };

    ThemeManifest::from_json_slice(&json)
        .map_err(|e| AppError::Engine(engine::common::ThemeError::Decode(e)))
}

fn require_catalog(catalog: &Option<Arc<HttpCatalog>>) -> Result<Arc<HttpCatalog>, AppError> {
    catalog.clone().ok_or_else(|| {
        AppError::Config(
            "No catalog endpoint is configured. \
             Set endpoint in the [catalog] section of config.toml."
                .to_string(),
        )
    })
}

fn print_notices(rx: &mpsc::Receiver<Notice>) {
    for notice in rx.try_iter() {
        eprintln!("{}", view::render_notice(&notice));
    }
}

/// Prints the final status, or turns an error status into the command's error
fn finish(controller: &LifecycleController) -> Result<(), AppError> {
    let status = controller.status();
    if status.kind == StatusKind::Error {
        return Err(AppError::State(status.text.clone()));
    }
    println!("{}", view::render_status(status));
    Ok(())
}

fn read_password() -> Result<zeroize::Zeroizing<String>, AppError> {
    eprint!("Password: ");
    let mut line = zeroize::Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| AppError::Io(format!("Failed to read password: {e}")))?;
    let trimmed = zeroize::Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
    Ok(trimmed)
}
