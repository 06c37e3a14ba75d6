use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reskin")]
#[command(about = "Browse, install, apply and report .reskin desktop themes")]
#[command(version)]
pub struct Cli {
    /// Use this config file instead of the discovered one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the manifest of a .reskin package
    Preview { file: PathBuf },

    /// Install a .reskin package
    Install {
        file: PathBuf,
        #[command(flatten)]
        apply: ApplyFlags,
    },

    /// Apply an installed theme
    Apply { name: String },

    /// Show whether a theme is installed
    Status { name: String },

    /// List catalog themes
    Browse {
        /// Only themes whose name, author, description or tags match
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a catalog theme and whether it can be installed or applied
    Details { theme_id: String },

    /// Install a catalog theme, or apply it if it is already installed
    Download {
        theme_id: String,
        #[command(flatten)]
        apply: ApplyFlags,
    },

    /// Report a catalog theme as malicious or broken
    Report {
        theme_id: String,
        #[arg(short, long)]
        reason: String,
    },

    /// Sign in to the catalog. The password is read from stdin.
    Login {
        #[arg(short, long)]
        email: String,
    },

    /// Create a catalog account. The password is read from stdin.
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Send a password recovery email
    Recover {
        #[arg(short, long)]
        email: String,
    },

    Logout,

    /// Show who is signed in
    Whoami,

    /// List recently installed themes
    Recent,

    /// Bundle a theme directory into a .reskin package
    Bundle(BundleArgs),

    Version,

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Default)]
pub struct ApplyFlags {
    /// Apply after installing
    #[arg(long, conflicts_with = "no_apply")]
    pub apply: bool,

    /// Do not apply after installing, whatever the config says
    #[arg(long)]
    pub no_apply: bool,
}

impl ApplyFlags {
    pub fn resolve(&self, configured: bool) -> bool {
        if self.apply {
            true
        } else if self.no_apply {
            false
        } else {
            configured
        }
    }
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Directory holding the theme assets
    pub directory: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Manifest fields. Without --name the directory's reskin.json is used.
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "theme-version")]
    pub theme_version: Option<String>,
    #[arg(long)]
    pub license: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub preview: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Create ~/.config/reskin/config.toml
    Init,
    /// Print the effective configuration
    Show,
}
