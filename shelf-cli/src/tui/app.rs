//! Core application state and mode management

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use shelf_core::config::expand_path;
use shelf_core::storage::write_atomic;
use shelf_core::transfer::{self, Format};
use shelf_core::{Book, BookId, Library, Storage, ViewQuery, VisibleBook};
use tracing::warn;

/// Input mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigate rows, trigger actions
    #[default]
    Normal,
    /// Typing into the search field (filters live)
    Search,
    /// Add form open
    Adding,
    /// Inline editor open on one row
    Editing,
    /// Import path prompt open
    Importing,
}

/// Which input of a book form has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Author,
}

/// Title/author inputs shared by the add form and the row editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub focus: FormField,
}

impl BookForm {
    pub fn prefilled(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            focus: FormField::Title,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
        }
    }

    pub fn insert(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Author,
            FormField::Author => FormField::Title,
        };
    }
}

/// A row drawn faded until its removal is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: BookId,
    pub requested_at: Instant,
}

const BLANK_FIELDS: &str = "Title and author must both be filled in.";

/// Main application state
#[derive(Debug)]
pub struct App<S: Storage> {
    pub library: Library<S>,
    /// Current input mode
    pub mode: Mode,
    /// Search text and sort settings for the list
    pub query: ViewQuery,
    /// Add form or row editor contents
    pub form: BookForm,
    /// Book under the row editor
    pub editing: Option<BookId>,
    /// Import prompt input
    pub import_input: String,
    pub pending_deletes: Vec<PendingDelete>,
    pub delete_fade: Duration,
    /// Where J/C exports land
    pub export_dir: PathBuf,
    /// Selected row in the visible list
    pub selected_index: usize,
    /// Status message (shown in status bar)
    pub status_message: Option<String>,
    pub show_help: bool,
}

impl<S: Storage> App<S> {
    pub fn new(
        library: Library<S>,
        query: ViewQuery,
        delete_fade: Duration,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            library,
            mode: Mode::Normal,
            query,
            form: BookForm::default(),
            editing: None,
            import_input: String::new(),
            pending_deletes: Vec::new(),
            delete_fade,
            export_dir: export_dir.into(),
            selected_index: 0,
            status_message: None,
            show_help: false,
        }
    }

    /// Rows in display order for the current query
    pub fn visible(&self) -> Vec<VisibleBook<'_>> {
        self.query.apply(self.library.books())
    }

    pub fn selected_id(&self) -> Option<BookId> {
        self.visible().get(self.selected_index).map(|entry| entry.book.id)
    }

    pub fn is_fading(&self, id: BookId) -> bool {
        self.pending_deletes.iter().any(|pending| pending.id == id)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.editing = None;
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(len.saturating_sub(1));
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.visible().len().saturating_sub(1);
    }

    /// Keep the selection inside the visible list after it shrinks
    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    // Search and sort

    pub fn enter_search(&mut self) {
        self.mode = Mode::Search;
    }

    pub fn search_insert(&mut self, c: char) {
        self.query.text.push(c);
        self.selected_index = 0;
    }

    pub fn search_backspace(&mut self) {
        self.query.text.pop();
        self.selected_index = 0;
    }

    pub fn clear_search(&mut self) {
        self.query.text.clear();
        self.selected_index = 0;
    }

    pub fn toggle_sort_field(&mut self) {
        self.query.field = self.query.field.toggled();
        self.set_status(format!("Sorted by {} ({})", self.query.field, self.query.order));
    }

    pub fn toggle_sort_order(&mut self) {
        self.query.order = self.query.order.toggled();
        self.set_status(format!("Sorted by {} ({})", self.query.field, self.query.order));
    }

    // Add

    pub fn open_add_form(&mut self) {
        self.form = BookForm::default();
        self.mode = Mode::Adding;
    }

    /// Submit the add form. It stays open if a field is blank.
    pub fn submit_add(&mut self) {
        let BookForm { title, author, .. } = self.form.clone();
        match self.library.add(&title, &author) {
            Ok(Some(id)) => {
                let shown = self.library.get(id).map(ToString::to_string).unwrap_or_default();
                self.set_status(format!("Added {shown}"));
                self.form = BookForm::default();
                self.exit_mode();
            }
            Ok(None) => self.set_status(BLANK_FIELDS),
            Err(err) => self.report_error("Failed to add book", err),
        }
    }

    // Edit

    /// Open the inline editor on the selected row
    pub fn start_edit(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.is_fading(id) {
            return;
        }
        if let Some(book) = self.library.get(id) {
            self.form = BookForm::prefilled(book);
            self.editing = Some(id);
            self.mode = Mode::Editing;
        }
    }

    /// Save the row editor. It stays open if a field is blank.
    pub fn submit_edit(&mut self) {
        let Some(id) = self.editing else {
            self.exit_mode();
            return;
        };
        let BookForm { title, author, .. } = self.form.clone();
        match self.library.update(id, &title, &author) {
            Ok(true) => {
                let shown = self.library.get(id).map(ToString::to_string).unwrap_or_default();
                self.set_status(format!("Saved {shown}"));
                self.exit_mode();
                self.clamp_selection();
            }
            Ok(false) => self.set_status(BLANK_FIELDS),
            Err(err) => self.report_error("Failed to save book", err),
        }
    }

    // Delete

    /// Fade the selected row; it is removed once the fade elapses
    pub fn request_delete(&mut self, now: Instant) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.is_fading(id) {
            return;
        }
        self.pending_deletes.push(PendingDelete {
            id,
            requested_at: now,
        });
    }

    /// Apply every delete whose fade has elapsed at `now`
    pub fn tick(&mut self, now: Instant) {
        let fade = self.delete_fade;
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_deletes
            .drain(..)
            .partition(|pending| now.saturating_duration_since(pending.requested_at) >= fade);
        self.pending_deletes = waiting;

        for pending in due {
            self.apply_delete(pending.id);
        }
    }

    /// Apply all pending deletes immediately
    pub fn flush_deletes(&mut self) {
        for pending in std::mem::take(&mut self.pending_deletes) {
            self.apply_delete(pending.id);
        }
    }

    fn apply_delete(&mut self, id: BookId) {
        match self.library.remove(id) {
            Ok(Some(book)) => self.set_status(format!("Removed {book}")),
            Ok(None) => {}
            Err(err) => self.report_error("Failed to remove book", err),
        }
        self.clamp_selection();
    }

    // Import / export

    pub fn open_import_prompt(&mut self) {
        self.import_input.clear();
        self.mode = Mode::Importing;
    }

    /// Path typed into the import prompt, if any
    /// The typed import path, with a leading `~/` expanded
    pub fn import_path(&self) -> Option<PathBuf> {
        let trimmed = Path::new(self.import_input.trim());
        if trimmed.as_os_str().is_empty() {
            return None;
        }
        Some(expand_path(trimmed).unwrap_or_else(|_| trimmed.to_path_buf()))
    }

    pub fn import(&mut self, path: &Path) {
        match transfer::import_file(&mut self.library, path) {
            Ok(report) => self.set_status(report.to_string()),
            Err(err) => {
                warn!(path = %path.display(), "import failed: {err}");
                self.set_status(err.to_string());
            }
        }
        self.clamp_selection();
    }

    /// Write the whole library to `<export_dir>/books.{json,csv}`
    pub fn export(&mut self, format: Format) -> Option<PathBuf> {
        let path = self.export_dir.join(format.default_file_name());
        let written = transfer::export(self.library.books(), format)
            .and_then(|content| write_atomic(&path, content.as_bytes()));

        match written {
            Ok(()) => {
                self.set_status(format!(
                    "Exported {} books to {}",
                    self.library.len(),
                    path.display()
                ));
                Some(path)
            }
            Err(err) => {
                self.report_error("Export failed", err);
                None
            }
        }
    }

    fn report_error(&mut self, what: &str, err: impl std::fmt::Display) {
        warn!("{what}: {err}");
        self.set_status(format!("{what}: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{MemoryStorage, SortField, SortOrder};
    use std::fs;
    use tempfile::TempDir;

    const FADE: Duration = Duration::from_millis(400);

    fn app_with(pairs: &[(&str, &str)]) -> App<MemoryStorage> {
        let mut library = Library::load(MemoryStorage::new());
        for (title, author) in pairs {
            library.add(title, author).unwrap();
        }
        App::new(library, ViewQuery::default(), FADE, std::env::temp_dir())
    }

    fn visible_titles(app: &App<MemoryStorage>) -> Vec<String> {
        app.visible().iter().map(|v| v.book.title.clone()).collect()
    }

    #[test]
    fn test_edit_save_updates_row_and_closes_editor() {
        let mut app = app_with(&[("Dune", "Herbert"), ("Emma", "Austen")]);
        app.start_edit();
        assert_eq!(app.mode, Mode::Editing);
        assert_eq!(app.form.title, "Dune");

        app.form.next_field();
        app.form.insert('!');
        app.submit_edit();

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.editing, None);
        assert_eq!(app.library.books()[0].author, "Herbert!");
        assert_eq!(app.library.books()[0].title, "Dune");
    }

    #[test]
    fn test_edit_with_blank_field_stays_open() {
        let mut app = app_with(&[("Dune", "Herbert")]);
        app.start_edit();
        app.form.title.clear();
        app.submit_edit();

        assert_eq!(app.mode, Mode::Editing);
        assert_eq!(app.status_message.as_deref(), Some(BLANK_FIELDS));
        assert_eq!(app.library.books()[0].title, "Dune");
    }

    #[test]
    fn test_delete_fades_then_removes() {
        let mut app = app_with(&[("Dune", "Herbert"), ("Emma", "Austen")]);
        let start = Instant::now();
        let id = app.selected_id().unwrap();

        app.request_delete(start);
        assert!(app.is_fading(id));

        app.tick(start + Duration::from_millis(100));
        assert_eq!(app.library.len(), 2);

        app.tick(start + FADE);
        assert_eq!(app.library.len(), 1);
        assert!(!app.is_fading(id));
        assert_eq!(visible_titles(&app), vec!["Emma"]);
    }

    #[test]
    fn test_delete_twice_on_same_row_is_ignored() {
        let mut app = app_with(&[("Dune", "Herbert"), ("Emma", "Austen")]);
        let start = Instant::now();
        app.request_delete(start);
        app.request_delete(start + Duration::from_millis(10));
        assert_eq!(app.pending_deletes.len(), 1);

        app.tick(start + FADE * 2);
        assert_eq!(app.library.len(), 1);
    }

    #[test]
    fn test_flush_applies_pending_deletes() {
        let mut app = app_with(&[("Dune", "Herbert")]);
        app.request_delete(Instant::now());
        app.flush_deletes();
        assert!(app.library.is_empty());
        assert!(app.pending_deletes.is_empty());
    }

    #[test]
    fn test_search_narrows_visible_rows() {
        let mut app = app_with(&[("Dune", "Herbert"), ("Emma", "Austen"), ("Persuasion", "Austen")]);
        for c in "AUST".chars() {
            app.search_insert(c);
        }
        assert_eq!(visible_titles(&app), vec!["Emma", "Persuasion"]);

        app.clear_search();
        assert_eq!(visible_titles(&app).len(), 3);
    }

    #[test]
    fn test_sort_toggles_reorder_rows() {
        let mut app = app_with(&[("Emma", "Austen"), ("Dune", "Herbert")]);
        assert_eq!(visible_titles(&app), vec!["Dune", "Emma"]);

        app.toggle_sort_order();
        assert_eq!(app.query.order, SortOrder::Desc);
        assert_eq!(visible_titles(&app), vec!["Emma", "Dune"]);

        app.toggle_sort_field();
        assert_eq!(app.query.field, SortField::Author);
        assert_eq!(visible_titles(&app), vec!["Dune", "Emma"]);
    }

    #[test]
    fn test_add_form_rejects_blank_then_accepts() {
        let mut app = app_with(&[]);
        app.open_add_form();
        for c in "Kindred".chars() {
            app.form.insert(c);
        }
        app.submit_add();
        assert_eq!(app.mode, Mode::Adding);
        assert!(app.library.is_empty());

        app.form.next_field();
        for c in "Butler".chars() {
            app.form.insert(c);
        }
        app.submit_add();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.library.books()[0].author, "Butler");
    }

    #[test]
    fn test_export_and_import_through_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(&[("Dune", "Herbert")]);
        app.export_dir = dir.path().to_path_buf();

        let path = app.export(Format::Csv).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Title,Author\nDune,Herbert");

        fs::write(&path, "Title,Author\nDune,Herbert\nFoundation,Asimov").unwrap();
        app.import(&path);
        assert_eq!(app.status_message.as_deref(), Some("1 books imported successfully."));
        assert_eq!(app.library.len(), 2);
    }

    #[test]
    fn test_import_bad_extension_leaves_library_alone() {
        let mut app = app_with(&[("Dune", "Herbert")]);
        app.import(Path::new("books.txt"));
        assert_eq!(app.library.len(), 1);
        assert!(app
            .status_message
            .as_deref()
            .unwrap_or_default()
            .contains("Unsupported file type"));
    }

    #[test]
    fn test_import_path_expands_home() {
        let mut app = app_with(&[]);
        assert_eq!(app.import_path(), None);

        app.import_input = "  ~/books.csv ".to_string();
        let path = app.import_path().unwrap();
        assert!(path.ends_with("books.csv"));
        assert!(!path.starts_with("~"));
        if let Some(home) = std::env::var_os("HOME").filter(|home| !home.is_empty()) {
            assert_eq!(path, PathBuf::from(home).join("books.csv"));
        }

        app.import_input = "list.csv".to_string();
        assert_eq!(app.import_path(), Some(PathBuf::from("list.csv")));
    }

    #[test]
    fn test_selection_clamped_after_delete() {
        let mut app = app_with(&[("A", "x"), ("B", "y")]);
        app.select_last();
        app.request_delete(Instant::now());
        app.flush_deletes();
        assert_eq!(app.selected_index, 0);
    }
}
