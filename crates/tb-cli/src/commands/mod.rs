//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod auth;
pub mod comment;
pub mod config;
pub mod context;
pub mod init;
pub mod post;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = ".threadboard/config.toml";

/// threadboard - threaded discussions with votes
#[derive(Debug, Parser)]
#[command(name = "threadboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "THREADBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the forum data
    #[arg(long, global = true, env = "THREADBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a threadboard configuration
    Init(init::InitArgs),

    /// Register a new account and sign in
    Signup(auth::SignupArgs),

    /// Sign in to an existing account
    Login(auth::LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Browse, write and vote on posts
    #[command(subcommand)]
    Post(post::PostCommand),

    /// Read and write comments
    #[command(subcommand)]
    Comment(comment::CommentCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Config file in use
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let global = GlobalArgs {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    // Dispatch to command handler
    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Signup(args) => auth::signup(args, &global),
        Commands::Login(args) => auth::login(args, &global),
        Commands::Logout => auth::logout(&global),
        Commands::Whoami => auth::whoami(&global),
        Commands::Post(cmd) => post::execute(cmd, &global),
        Commands::Comment(cmd) => comment::execute(cmd, &global),
        Commands::Config(cmd) => config::execute(cmd, &global),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_parse_nested_command() {
        let cli = Cli::try_parse_from([
            "threadboard",
            "-vv",
            "--data-dir",
            "/tmp/tb",
            "comment",
            "reply",
            "3",
            "7",
            "Thanks!",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tb")));
        assert!(matches!(cli.command, Commands::Comment(_)));
    }

    #[test]
    fn test_default_config_path() {
        let global = GlobalArgs::default();
        assert!(global.config_path().ends_with("config.toml"));
    }
}
