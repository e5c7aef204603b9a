//! Structured error types for shelf-core library.
//!
//! Uses `thiserror` for better API surface and error composition.
//! The `shelf` binary wraps these in `anyhow` at command boundaries,
//! but library consumers get structured, composable errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shelf-core operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// TOML parsing failed
    #[error("Invalid TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Import file extension is neither .json nor .csv
    #[error("Unsupported file type: {path:?}")]
    UnsupportedFileType { path: PathBuf },

    /// Import content could not be parsed; nothing was applied
    #[error("Error importing file. Please check the format. ({reason})")]
    ImportParse { reason: String },

    /// Row index outside the library bounds
    #[error("No book at position {index} (library has {len})")]
    InvalidIndex { index: usize, len: usize },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for shelf-core operations
pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a TOML error for a config file
    pub fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Toml {
            path: path.into(),
            source,
        }
    }

    /// Create an unsupported file type error
    pub fn unsupported_file_type(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFileType { path: path.into() }
    }

    /// Create an import parse error
    pub fn import_parse(reason: impl Into<String>) -> Self {
        Self::ImportParse {
            reason: reason.into(),
        }
    }

    /// Create an invalid index error
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
