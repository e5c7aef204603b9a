//! Tracing setup for the shelf CLI
//!
//! Usage:
//!   shelf --debug ...              # Debug logging to stderr
//!   RUST_LOG=shelf_core=debug shelf  # Fine-grained log control
//!
//! Logs always go to stderr so exported data on stdout stays clean. The
//! TUI owns the terminal, so it logs to `<data_dir>/shelf.log` instead.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (used unless RUST_LOG is set)
    pub debug: bool,
    /// Append to this file instead of writing to stderr
    pub log_file: Option<PathBuf>,
}

fn env_filter(debug: bool) -> EnvFilter {
    let fallback = if debug { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initialize the global subscriber
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = env_filter(config.debug);

    match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(config.debug)
                .compact()
                .try_init()
                .map_err(|err| anyhow!(err))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(config.debug)
            .compact()
            .try_init()
            .map_err(|err| anyhow!(err)),
    }
}
