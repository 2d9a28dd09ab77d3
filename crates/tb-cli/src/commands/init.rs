//! Init command
//!
//! Create a threadboard configuration in a directory.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tb_core::config::Config;

/// Arguments for the init command
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,

    /// Directory to initialize (default: current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Keep forum data inside the project instead of the user data directory
    #[arg(long)]
    pub local_data: bool,
}

/// Execute the init command
pub fn execute(args: InitArgs) -> Result<()> {
    use colored::Colorize;

    let project_dir = args
        .path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    println!("Initializing threadboard in {}...", project_dir.display());

    let config_dir = project_dir.join(".threadboard");
    let config_path = config_dir.join("config.toml");
    if config_path.exists() && !args.force {
        eprintln!(
            "{} threadboard already initialized. Use --force to reinitialize.",
            "⚠".yellow()
        );
        return Ok(());
    }

    let mut config = Config::default();
    if args.local_data {
        config.storage.data_dir = Some(config_dir.join("data"));
    }
    config
        .save(&config_path)
        .context("Failed to write config.toml")?;
    println!("{} Generated .threadboard/config.toml", "✓".green());
    if let Some(dir) = &config.storage.data_dir {
        println!("{} Forum data will be stored in {}", "✓".green(), dir.display());
    }

    println!("\n{}", "Next steps:".bold());
    println!("  1. Create an account:");
    println!("     {}", "threadboard signup you@example.com".cyan());
    println!("  2. Start a thread:");
    println!(
        "     {}",
        "threadboard post create --title \"Hello\" --description \"...\"".cyan()
    );

    Ok(())
}
