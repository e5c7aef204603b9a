//! Key-value slots backing the library.
//!
//! A slot holds one serialized value and is always rewritten whole. The file
//! backend maps `key` to `<dir>/<key>.json` and swaps a temp file into place
//! so a crash mid-write never leaves a truncated slot behind.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Slot name the library is stored under.
pub const BOOKS_KEY: &str = "books";

/// A persistent key-value slot store
pub trait Storage {
    /// Read a slot; `Ok(None)` when it was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's value
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Slots stored as JSON files in one directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a slot
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        write_atomic(&path, value.as_bytes())?;
        debug!(path = %path.display(), bytes = value.len(), "slot written");
        Ok(())
    }
}

/// In-process slots, used by tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage with one slot pre-populated
    pub fn with_slot(key: &str, value: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_owned(), value.into());
        Self { slots }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Write `data` to `path` via a synced sibling temp file and a rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slot".to_owned());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    Ok(())
}
