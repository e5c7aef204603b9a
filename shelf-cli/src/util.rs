use std::fmt;
use std::process::ExitCode;

use shelf_core::ShelfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Io,
    Validation,
    Config,
}

/// A command failure plus the exit code class it maps to
#[derive(Debug)]
pub struct AppError {
    pub(crate) kind: ErrorKind,
    pub(crate) source: anyhow::Error,
}

impl AppError {
    pub fn new(kind: ErrorKind, source: anyhow::Error) -> Self {
        Self { kind, source }
    }

    pub fn io<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::new(ErrorKind::Io, err.into())
    }

    pub fn validation<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::new(ErrorKind::Validation, err.into())
    }

    pub fn config<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::new(ErrorKind::Config, err.into())
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Input => ExitCode::from(1),
            ErrorKind::Io => ExitCode::from(2),
            ErrorKind::Validation | ErrorKind::Config => ExitCode::from(3),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl From<ShelfError> for AppError {
    fn from(err: ShelfError) -> Self {
        let kind = match &err {
            ShelfError::Io { .. } | ShelfError::Json { .. } => ErrorKind::Io,
            ShelfError::UnsupportedFileType { .. } | ShelfError::ImportParse { .. } => {
                ErrorKind::Input
            }
            ShelfError::InvalidIndex { .. } => ErrorKind::Validation,
            ShelfError::Toml { .. } | ShelfError::Config { .. } => ErrorKind::Config,
        };
        Self::new(kind, err.into())
    }
}
