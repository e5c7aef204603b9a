use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use shelf_core::config::expand_path;
use shelf_core::ShelfConfig;

use crate::util::AppError;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Print the effective configuration as TOML
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<(), AppError> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, explicit),
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Path => {
            println!("{}", config_path(explicit)?.display());
            Ok(())
        }
    }
}

fn config_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    let path = match explicit {
        Some(path) => expand_path(path)?,
        None => ShelfConfig::config_path()?,
    };
    Ok(path)
}

fn run_init(args: InitArgs, explicit: Option<&Path>) -> Result<(), AppError> {
    let config_path = config_path(explicit)?;

    if config_path.exists() && !args.force {
        return Err(AppError::config(anyhow!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))
            .map_err(AppError::io)?;
    }

    ShelfConfig::default().save(&config_path)?;

    println!("✓ Created config at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {}", config_path.display());
    println!("  2. Check the result: shelf config show");

    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<(), AppError> {
    let config = ShelfConfig::load(explicit)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
