//! Command implementations for the shelf CLI

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use shelf_core::{ChangeLogger, FileStorage, Library, ShelfConfig};
use tracing::debug;

use crate::util::AppError;

pub mod books;
pub mod transfer;

/// Resolved configuration shared by every library command
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ShelfConfig,
    pub data_dir: PathBuf,
}

impl Context {
    /// Load config (flag, `$SHELF_CONFIG`, default path) and resolve the data directory
    pub fn load(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, AppError> {
        let config = ShelfConfig::load(config_path)?;
        let data_dir = config.data_dir(data_dir)?;
        debug!(data_dir = %data_dir.display(), "resolved data directory");
        Ok(Self { config, data_dir })
    }

    /// Open the library stored in the data directory, logging every change
    pub fn open_library(&self) -> Result<Library<FileStorage>, AppError> {
        let storage = FileStorage::open(&self.data_dir)
            .with_context(|| format!("Failed to open data directory {}", self.data_dir.display()))
            .map_err(AppError::io)?;

        let mut library = Library::load(storage).with_policy(self.config.import.policy());
        library.subscribe(ChangeLogger);
        Ok(library)
    }
}
