//! # Theme Manager Module
//!
//! The native command surface of the engine.
//!
//! ## Core Components
//!
//! - [`ThemeManager`] - Owns the lifecycle components and executes commands
//! - [`ThemeCommand`] / [`ThemeResponse`] - Command/response pattern for operations
//! - [`CommandExecutor`] - The seam the presentation layer depends on
//!
//! Every failure comes back as [`ThemeResponse::Error`] carrying a
//! [`ThemeError`](crate::common::ThemeError) whose message can be shown to the
//! user verbatim.
//!
//! ## Usage
//!
//! ```no_run
//! use engine::theme_manager::{ThemeCommand, ThemeResponse};
//! # async fn demo(manager: &engine::theme_manager::ThemeManager) {
//!
//! match manager.execute_command(ThemeCommand::GetRecentThemes).await {
//!     ThemeResponse::RecentThemes { themes } => {
//!         for theme in themes {
//!             println!("{} by {}", theme.name, theme.author);
//!         }
//!     }
//!     ThemeResponse::Error { error } => eprintln!("{error}"),
//!     _ => {}
//! }
//! # }
//! ```

pub use self::commands::ThemeCommand;
pub use self::manager::{CommandExecutor, ThemeManager, ThemeManagerConfig};
pub use self::responses::ThemeResponse;

/// Command handlers for each group of commands
pub mod command_handlers;
/// Command definitions
pub mod commands;
/// The manager and the executor trait
pub mod manager;
/// Response definitions
pub mod responses;
