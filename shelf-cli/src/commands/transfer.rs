//! Import and export commands
//!
//! Import picks the parser from the file extension (.json or .csv) and
//! merges the rows into the stored library, skipping books already there.
//! Export writes the whole library to a file or to stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use shelf_core::storage::write_atomic;
use shelf_core::transfer::{self, Format};
use tracing::info;

use super::Context;
use crate::ui;
use crate::util::AppError;

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// File to import (.json or .csv)
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output format
    #[arg(long, short, value_enum, default_value = "json")]
    pub format: FormatArg,

    /// Output file or directory (default: stdout)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Csv => Format::Csv,
        }
    }
}

pub fn run_import(ctx: &Context, args: ImportArgs) -> Result<(), AppError> {
    let mut library = ctx.open_library()?;

    let report = ui::with_spinner(
        format!("Importing {}", args.file.display()),
        |report: &transfer::ImportReport| {
            format!("Read {} rows from {} file", report.candidates, report.format)
        },
        || transfer::import_file(&mut library, &args.file),
    )?;

    println!("{report}");
    Ok(())
}

pub fn run_export(ctx: &Context, args: ExportArgs) -> Result<(), AppError> {
    let library = ctx.open_library()?;
    let format = Format::from(args.format);
    let content = transfer::export(library.books(), format)?;

    let Some(out) = args.out else {
        println!("{content}");
        return Ok(());
    };

    let path = if out.is_dir() {
        out.join(format.default_file_name())
    } else {
        out
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))
            .map_err(AppError::io)?;
    }

    ui::with_spinner(
        format!("Writing {}", path.display()),
        |_| format!("Wrote {} {} bytes", format, content.len()),
        || write_atomic(&path, content.as_bytes()),
    )?;
    info!(path = %path.display(), %format, count = library.len(), "library exported");
    println!("✓ Exported {} books to {}", library.len(), path.display());
    Ok(())
}
