//! The library store: an ordered list of books mirrored to a storage slot.
//!
//! Every successful mutation rewrites the whole slot and then notifies the
//! registered observers. Rejected mutations (blank fields, unknown ids,
//! out-of-range positions) change nothing, write nothing and notify nobody.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::book::{normalize, Book, BookId, Candidate};
use crate::error::{Result, ShelfError};
use crate::storage::{Storage, BOOKS_KEY};

/// How an import batch is checked for duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Compare candidates against the pre-import library only; repeats
    /// inside one batch are all kept.
    #[default]
    StoreOnly,
    /// Also drop a candidate that repeats an earlier survivor of the batch.
    StoreAndBatch,
}

/// A change applied to the library, delivered to observers after it is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryChange {
    Added(Book),
    Updated { before: Book, after: Book },
    Removed { index: usize, book: Book },
    Imported { books: Vec<Book> },
}

/// Trait for library change observation
pub trait LibraryObserver {
    /// Called after a mutation has been written to storage
    fn on_change(&self, change: &LibraryChange);
}

/// Logs every change through `tracing`
#[derive(Debug, Default)]
pub struct ChangeLogger;

impl LibraryObserver for ChangeLogger {
    fn on_change(&self, change: &LibraryChange) {
        match change {
            LibraryChange::Added(book) => info!(id = %book.id, "added {}", book),
            LibraryChange::Updated { before, after } => {
                info!(id = %after.id, "edited {} -> {}", before, after)
            }
            LibraryChange::Removed { index, book } => {
                info!(id = %book.id, index, "removed {}", book)
            }
            LibraryChange::Imported { books } => info!(count = books.len(), "imported books"),
        }
    }
}

/// The book library and its persistent slot
pub struct Library<S: Storage> {
    storage: S,
    books: Vec<Book>,
    policy: DedupPolicy,
    observers: Vec<Box<dyn LibraryObserver>>,
}

impl<S: Storage> fmt::Debug for Library<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("books", &self.books)
            .field("policy", &self.policy)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: Storage> Library<S> {
    /// Load the library from `storage`.
    ///
    /// A missing, unreadable or malformed slot yields an empty library; the
    /// cause is logged and never returned.
    pub fn load(storage: S) -> Self {
        let books = match storage.read(BOOKS_KEY) {
            Ok(Some(data)) => decode_books(&data),
            Ok(None) => {
                debug!("no stored library, starting empty");
                Vec::new()
            }
            Err(err) => {
                warn!("failed to read stored library, starting empty: {err}");
                Vec::new()
            }
        };

        debug!(count = books.len(), "library loaded");
        Self {
            storage,
            books,
            policy: DedupPolicy::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: DedupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Register an observer for subsequent changes
    pub fn subscribe(&mut self, observer: impl LibraryObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Position of a book in base order
    pub fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    /// Id of the book at a base-order position
    pub fn id_at(&self, index: usize) -> Result<BookId> {
        self.books
            .get(index)
            .map(|book| book.id)
            .ok_or_else(|| ShelfError::invalid_index(index, self.books.len()))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append a book. Returns `None` (and does nothing) if a field is blank.
    pub fn add(&mut self, title: &str, author: &str) -> Result<Option<BookId>> {
        let Some(book) = Book::new(title, author) else {
            debug!("add rejected: blank title or author");
            return Ok(None);
        };

        let id = book.id;
        let mut next = self.books.clone();
        next.push(book.clone());
        self.commit(next)?;
        self.notify(&LibraryChange::Added(book));
        Ok(Some(id))
    }

    /// Replace a book's fields in place, keeping its id and position.
    pub fn update(&mut self, id: BookId, title: &str, author: &str) -> Result<bool> {
        let Some((title, author)) = normalize(title, author) else {
            debug!(%id, "edit rejected: blank title or author");
            return Ok(false);
        };
        let Some(index) = self.position(id) else {
            debug!(%id, "edit rejected: unknown book");
            return Ok(false);
        };

        let mut next = self.books.clone();
        let before = next[index].clone();
        next[index].title = title;
        next[index].author = author;
        let after = next[index].clone();

        self.commit(next)?;
        self.notify(&LibraryChange::Updated { before, after });
        Ok(true)
    }

    /// [`Library::update`] addressed by base-order position
    pub fn update_at(&mut self, index: usize, title: &str, author: &str) -> Result<bool> {
        match self.books.get(index) {
            Some(book) => {
                let id = book.id;
                self.update(id, title, author)
            }
            None => {
                debug!(index, "edit rejected: index out of bounds");
                Ok(false)
            }
        }
    }

    /// Delete one book; the rest keep their relative order.
    pub fn remove(&mut self, id: BookId) -> Result<Option<Book>> {
        let Some(index) = self.position(id) else {
            debug!(%id, "remove rejected: unknown book");
            return Ok(None);
        };

        let mut next = self.books.clone();
        let book = next.remove(index);
        self.commit(next)?;
        self.notify(&LibraryChange::Removed {
            index,
            book: book.clone(),
        });
        Ok(Some(book))
    }

    /// [`Library::remove`] addressed by base-order position
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Book>> {
        match self.books.get(index) {
            Some(book) => {
                let id = book.id;
                self.remove(id)
            }
            None => {
                debug!(index, "remove rejected: index out of bounds");
                Ok(None)
            }
        }
    }

    /// Append the import candidates that pass the presence check and are not
    /// already in the library. Returns how many were appended.
    pub fn import_merge<I>(&mut self, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut seen: HashSet<(String, String)> = self
            .books
            .iter()
            .map(|book| (book.title.clone(), book.author.clone()))
            .collect();

        let mut survivors = Vec::new();
        let mut dropped = 0usize;
        for candidate in candidates {
            let Some((title, author)) = candidate.normalized() else {
                dropped += 1;
                continue;
            };

            let key = (title, author);
            if seen.contains(&key) {
                dropped += 1;
                continue;
            }
            if self.policy == DedupPolicy::StoreAndBatch {
                seen.insert(key.clone());
            }

            let (title, author) = key;
            survivors.push(Book {
                id: BookId::new(),
                title,
                author,
            });
        }

        debug!(appended = survivors.len(), dropped, "import merge");
        if survivors.is_empty() {
            return Ok(0);
        }

        let count = survivors.len();
        let mut next = self.books.clone();
        next.extend(survivors.iter().cloned());
        self.commit(next)?;
        self.notify(&LibraryChange::Imported { books: survivors });
        Ok(count)
    }

    /// Rewrite the storage slot with the full library
    pub fn persist(&mut self) -> Result<()> {
        let data = encode_books(&self.books)?;
        self.storage.write(BOOKS_KEY, &data)
    }

    /// Write `next` to storage and only then make it the library.
    /// On failure memory keeps the previous, still-stored books.
    fn commit(&mut self, next: Vec<Book>) -> Result<()> {
        let data = encode_books(&next)?;
        self.storage.write(BOOKS_KEY, &data)?;
        self.books = next;
        Ok(())
    }

    fn notify(&self, change: &LibraryChange) {
        for observer in &self.observers {
            observer.on_change(change);
        }
    }
}

fn encode_books(books: &[Book]) -> Result<String> {
    serde_json::to_string(books).map_err(|err| ShelfError::json("serializing library", err))
}

/// Decode a stored slot, keeping every record that passes the presence check.
fn decode_books(data: &str) -> Vec<Book> {
    let values = match serde_json::from_str::<Value>(data) {
        Ok(Value::Array(values)) => values,
        Ok(Value::Null) => return Vec::new(),
        Ok(other) => {
            warn!(
                "stored library is not a JSON array ({}), starting empty",
                json_kind(&other)
            );
            return Vec::new();
        }
        Err(err) => {
            warn!("stored library is not valid JSON, starting empty: {err}");
            return Vec::new();
        }
    };

    let mut ids = HashSet::new();
    let mut books = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let mut book = match serde_json::from_value::<Book>(value) {
            Ok(book) => book,
            Err(err) => {
                warn!(index = idx, "skipping unreadable stored book: {err}");
                continue;
            }
        };
        let Some((title, author)) = normalize(&book.title, &book.author) else {
            warn!(index = idx, "skipping stored book with blank title or author");
            continue;
        };
        book.title = title;
        book.author = author;
        if !ids.insert(book.id) {
            book.id = BookId::new();
            ids.insert(book.id);
        }
        books.push(book);
    }
    books
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
