pub mod book;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod view;

pub use book::{Book, BookId, BookRecord, Candidate};
pub use config::ShelfConfig;
pub use error::{Result, ShelfError};
pub use storage::{FileStorage, MemoryStorage, Storage, BOOKS_KEY};
pub use store::{ChangeLogger, DedupPolicy, Library, LibraryChange, LibraryObserver};
pub use transfer::{import_file, Format, ImportReport};
pub use view::{SortField, SortOrder, ViewQuery, VisibleBook};
