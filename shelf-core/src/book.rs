use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned to a book when it enters the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book record as held by the library and written to storage.
///
/// Title and author are always trimmed and non-empty; construct through
/// [`Book::new`] to keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: BookId,
    pub title: String,
    pub author: String,
}

impl Book {
    /// Build a book with a fresh id, or `None` if either field is blank.
    pub fn new(title: &str, author: &str) -> Option<Self> {
        let (title, author) = normalize(title, author)?;
        Some(Self {
            id: BookId::new(),
            title,
            author,
        })
    }

    pub fn record(&self) -> BookRecord {
        BookRecord {
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

/// The id-less `{title, author}` shape used by export files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
}

/// An import row before validation. Either field may be missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
        }
    }

    /// Trimmed `(title, author)` if both are present and non-empty.
    pub fn normalized(&self) -> Option<(String, String)> {
        normalize(self.title.as_deref()?, self.author.as_deref()?)
    }
}

/// Trim both fields; `None` when either ends up empty.
pub fn normalize(title: &str, author: &str) -> Option<(String, String)> {
    let title = title.trim();
    let author = author.trim();
    if title.is_empty() || author.is_empty() {
        return None;
    }
    Some((title.to_owned(), author.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let book = Book::new("  Dune ", "\tHerbert\n").unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.to_string(), "Dune by Herbert");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(Book::new("", "Herbert").is_none());
        assert!(Book::new("Dune", "   ").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Book::new("Dune", "Herbert").unwrap();
        let b = Book::new("Dune", "Herbert").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.record(), b.record());
    }

    #[test]
    fn test_legacy_record_gets_id() {
        let book: Book = serde_json::from_str(r#"{"title":"Dune","author":"Herbert"}"#).unwrap();
        assert_eq!(book.title, "Dune");
        assert!(!book.id.as_uuid().is_nil());
    }

    #[test]
    fn test_candidate_missing_author() {
        let candidate: Candidate = serde_json::from_str(r#"{"title":"Dune"}"#).unwrap();
        assert_eq!(candidate.normalized(), None);
    }
}
