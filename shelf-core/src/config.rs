use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShelfError};
use crate::storage::write_atomic;
use crate::store::DedupPolicy;
use crate::view::{SortField, SortOrder};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SHELF_CONFIG";
/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SHELF_DATA_DIR";

/// Delay between acknowledging a delete and applying it
pub const DEFAULT_DELETE_FADE_MS: u64 = 400;

/// Shelf configuration (~/.shelf/config.toml)
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding books.json
    /// Defaults to ~/.shelf if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub sort_field: SortField,

    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Also drop repeats inside a single import batch
    #[serde(default)]
    pub dedupe_within_batch: bool,
}

impl ImportConfig {
    pub fn policy(&self) -> DedupPolicy {
        if self.dedupe_within_batch {
            DedupPolicy::StoreAndBatch
        } else {
            DedupPolicy::StoreOnly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a deleted row stays faded before it disappears
    #[serde(default = "default_delete_fade_ms")]
    pub delete_fade_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            delete_fade_ms: DEFAULT_DELETE_FADE_MS,
        }
    }
}

fn default_delete_fade_ms() -> u64 {
    DEFAULT_DELETE_FADE_MS
}

impl ShelfConfig {
    /// Load config from an explicit path, `$SHELF_CONFIG`, or ~/.shelf/config.toml.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let path = expand_path(path)?;
            if !path.exists() {
                return Err(ShelfError::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            return Self::load_from(&path);
        }

        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|err| ShelfError::toml(path, err))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get config file path: `$SHELF_CONFIG` or ~/.shelf/config.toml
    pub fn config_path() -> Result<PathBuf> {
        match env::var_os(CONFIG_ENV) {
            Some(value) if !value.is_empty() => expand_path(Path::new(&value)),
            _ => Ok(home_dir()?.join("config.toml")),
        }
    }

    /// Resolve the data directory: flag, then `$SHELF_DATA_DIR`, then config, then ~/.shelf
    pub fn data_dir(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return expand_path(dir);
        }
        if let Some(value) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return expand_path(Path::new(&value));
        }
        if let Some(dir) = self.storage.data_dir.as_deref() {
            return expand_path(Path::new(dir));
        }
        home_dir()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| ShelfError::config(format!("failed to serialize config: {err}")))
    }

    /// Write config to a file, replacing what was there
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_str = self.to_toml()?;
        write_atomic(path, toml_str.as_bytes())
    }
}

/// ~/.shelf
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".shelf"))
        .ok_or_else(|| ShelfError::config("could not determine home directory"))
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| ShelfError::config("unable to resolve home directory"))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
