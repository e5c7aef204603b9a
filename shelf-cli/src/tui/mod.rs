//! Interactive library view
//!
//! A single list of books with inline editing, a delete fade, live search,
//! sort toggles and JSON/CSV import/export against the data directory.

pub mod app;
pub mod event;
pub mod terminal;
pub mod ui;

pub use terminal::run;
