//! Config command
//!
//! Inspect and reset the threadboard configuration.

use super::context::data_dir;
use super::GlobalArgs;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::fs;
use std::path::Path;
use tb_core::config::Config;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the config file and data directory in use
    Path,

    /// Check the configuration for errors
    Validate,

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: &GlobalArgs) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(global, json),
        ConfigCommand::Path => show_paths(global),
        ConfigCommand::Validate => validate_config(global),
        ConfigCommand::Reset { force } => reset_config(&global.config_path(), force),
    }
}

fn show_config(global: &GlobalArgs, as_json: bool) -> Result<()> {
    let config_path = global.config_path();
    let config = Config::load_or_default(&config_path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if config_path.exists() {
        println!("{}", config_path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults, no config file)".dimmed());
    }
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn show_paths(global: &GlobalArgs) -> Result<()> {
    let config_path = global.config_path();
    let config = Config::load_or_default(&config_path)?;
    println!("config: {}", config_path.display());
    println!("data:   {}", data_dir(global, &config).display());
    Ok(())
}

fn validate_config(global: &GlobalArgs) -> Result<()> {
    let config_path = global.config_path();
    if !config_path.exists() {
        eprintln!(
            "{} Configuration not found at {}, defaults apply.",
            "⚠".yellow(),
            config_path.display()
        );
    }
    let config = Config::load_or_default(&config_path)?;
    config.validate()?;
    println!("{} Configuration is valid.", "✓".green());
    Ok(())
}

fn reset_config(config_path: &Path, force: bool) -> Result<()> {
    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)
            .with_context(|| format!("Failed to back up {}", config_path.display()))?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    Config::default().save(config_path)?;
    println!("{} Configuration reset to defaults.", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reset_backs_up_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[auth]\nbcrypt_cost = 4\n").unwrap();

        reset_config(&path, true).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.auth.bcrypt_cost, 10);
        let backups = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_reset_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        reset_config(&path, true).unwrap();

        assert!(path.exists());
    }
}
