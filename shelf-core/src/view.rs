//! Filter/sort projection of the library into display order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::error::ShelfError;

/// Field the view is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Author,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortField::Title => SortField::Author,
            SortField::Author => SortField::Title,
        }
    }

    fn key<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SortField::Title => &book.title,
            SortField::Author => &book.author,
        }
    }
}

impl FromStr for SortField {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            other => Err(ShelfError::config(format!(
                "unknown sort field '{other}' (expected title or author)"
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(ShelfError::config(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search text plus sort settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub text: String,
    pub field: SortField,
    pub order: SortOrder,
}

impl ViewQuery {
    pub fn new(text: impl Into<String>, field: SortField, order: SortOrder) -> Self {
        Self {
            text: text.into(),
            field,
            order,
        }
    }

    /// Case-insensitive substring match on title or author
    pub fn matches(&self, book: &Book) -> bool {
        book_matches(book, self.needle().as_deref())
    }

    /// Project `books` into display order.
    ///
    /// `index` in each entry is the book's position in `books`. Books with
    /// equal sort keys keep their base relative order in both directions.
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<VisibleBook<'a>> {
        let needle = self.needle();
        let mut visible: Vec<(String, VisibleBook<'a>)> = books
            .iter()
            .enumerate()
            .filter(|(_, book)| book_matches(book, needle.as_deref()))
            .map(|(index, book)| (self.field.key(book).to_lowercase(), VisibleBook { book, index }))
            .collect();

        // sort_by is stable, so ties keep base order
        visible.sort_by(|(a, _), (b, _)| self.order.apply(a.cmp(b)));

        visible.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Lowercased search text, `None` when the filter is off
    fn needle(&self) -> Option<String> {
        (!self.text.is_empty()).then(|| self.text.to_lowercase())
    }
}

fn book_matches(book: &Book, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => {
            book.title.to_lowercase().contains(needle) || book.author.to_lowercase().contains(needle)
        }
    }
}

/// One row of the projected view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleBook<'a> {
    pub book: &'a Book,
    /// Position in the underlying library
    pub index: usize,
}
