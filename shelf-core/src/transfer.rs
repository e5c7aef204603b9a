//! JSON and CSV import/export.
//!
//! The CSV dialect is deliberately naive: no quoting on export, and on
//! import every `"` is dropped and each line is split on bare commas. A
//! title or author containing a comma does not survive a CSV round trip.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::book::{Book, BookRecord, Candidate};
use crate::error::{Result, ShelfError};
use crate::storage::Storage;
use crate::store::Library;

/// Header line of exported CSV files
pub const CSV_HEADER: &str = "Title,Author";

/// Interchange file format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Pick the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            _ => Err(ShelfError::unsupported_file_type(path)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }

    /// File name used when exporting without an explicit path
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Format::Json => "books.json",
            Format::Csv => "books.csv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Pretty-printed JSON array of `{title, author}`
pub fn export_json(books: &[Book]) -> Result<String> {
    let records: Vec<BookRecord> = books.iter().map(Book::record).collect();
    serde_json::to_string_pretty(&records).map_err(|err| ShelfError::json("exporting library", err))
}

/// `Title,Author` header followed by one unescaped line per book
pub fn export_csv(books: &[Book]) -> String {
    let rows: Vec<String> = books
        .iter()
        .map(|book| format!("{},{}", book.title, book.author))
        .collect();
    format!("{CSV_HEADER}\n{}", rows.join("\n"))
}

pub fn export(books: &[Book], format: Format) -> Result<String> {
    match format {
        Format::Json => export_json(books),
        Format::Csv => Ok(export_csv(books)),
    }
}

/// Parse a JSON import: an array of objects with optional string fields.
pub fn parse_json(content: &str) -> Result<Vec<Candidate>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|err| ShelfError::import_parse(format!("invalid JSON: {err}")))?;

    let Value::Array(items) = value else {
        return Err(ShelfError::import_parse("expected a JSON array of books"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            if !item.is_object() {
                return Err(ShelfError::import_parse(format!(
                    "entry {idx} is not an object"
                )));
            }
            serde_json::from_value::<Candidate>(item)
                .map_err(|err| ShelfError::import_parse(format!("entry {idx}: {err}")))
        })
        .collect()
}

/// Parse a CSV import. The first line is a header and is skipped.
pub fn parse_csv(content: &str) -> Vec<Candidate> {
    content
        .trim()
        .split('\n')
        .skip(1)
        .map(|line| {
            let mut cells = line.split(',').map(clean_cell);
            Candidate {
                title: cells.next(),
                author: cells.next(),
            }
        })
        .collect()
}

fn clean_cell(cell: &str) -> String {
    cell.replace('"', "").trim().to_owned()
}

pub fn parse(content: &str, format: Format) -> Result<Vec<Candidate>> {
    match format {
        Format::Json => parse_json(content),
        Format::Csv => Ok(parse_csv(content)),
    }
}

/// Check the extension, read and parse an import file.
///
/// An unsupported extension is rejected before the file is opened.
pub fn read_import(path: &Path) -> Result<(Format, Vec<Candidate>)> {
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let candidates = parse(&content, format)?;
    debug!(path = %path.display(), %format, candidates = candidates.len(), "import file parsed");
    Ok((format, candidates))
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub format: Format,
    /// Rows found in the file
    pub candidates: usize,
    /// Books actually appended
    pub imported: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.candidates.saturating_sub(self.imported)
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} books imported successfully.", self.imported)
    }
}

/// Import a file into the library. Nothing is applied unless the whole file parses.
pub fn import_file<S: Storage>(library: &mut Library<S>, path: &Path) -> Result<ImportReport> {
    let (format, candidates) = read_import(path)?;
    let total = candidates.len();
    let imported = library.import_merge(candidates)?;
    info!(path = %path.display(), imported, total, "import finished");
    Ok(ImportReport {
        format,
        candidates: total,
        imported,
    })
}
