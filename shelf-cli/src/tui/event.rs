//! Event handling for the TUI

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use shelf_core::{Format, Storage};

use super::app::{App, Mode};

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Result of handling a key event
#[derive(Debug, PartialEq, Eq)]
pub enum HandleResult {
    /// Continue running
    Continue,
    /// Quit the application
    Quit,
    /// Write the library to the data directory
    Export(Format),
    /// Import the given file (blocks input while it runs)
    Import(PathBuf),
}

/// Handle a key event
pub fn handle_key<S: Storage>(app: &mut App<S>, key: KeyEvent) -> HandleResult {
    // Global quit shortcut
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return HandleResult::Quit;
    }

    // Any key dismisses help
    if app.show_help {
        app.show_help = false;
        return HandleResult::Continue;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Search => handle_search_mode(app, key),
        Mode::Adding | Mode::Editing => handle_form_mode(app, key),
        Mode::Importing => handle_import_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode<S: Storage>(app: &mut App<S>, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Char('q') => HandleResult::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            HandleResult::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            HandleResult::Continue
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.select_first();
            HandleResult::Continue
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
            HandleResult::Continue
        }

        // Row actions
        KeyCode::Char('e') | KeyCode::Enter => {
            app.start_edit();
            HandleResult::Continue
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.request_delete(Instant::now());
            HandleResult::Continue
        }

        KeyCode::Char('a') => {
            app.open_add_form();
            HandleResult::Continue
        }
        KeyCode::Char('/') => {
            app.enter_search();
            HandleResult::Continue
        }
        KeyCode::Char('s') => {
            app.toggle_sort_field();
            HandleResult::Continue
        }
        KeyCode::Char('o') => {
            app.toggle_sort_order();
            HandleResult::Continue
        }

        KeyCode::Char('J') => HandleResult::Export(Format::Json),
        KeyCode::Char('C') => HandleResult::Export(Format::Csv),
        KeyCode::Char('i') => {
            app.open_import_prompt();
            HandleResult::Continue
        }

        KeyCode::Char('?') => {
            app.show_help = true;
            HandleResult::Continue
        }
        KeyCode::Esc => {
            app.clear_status();
            HandleResult::Continue
        }

        _ => HandleResult::Continue,
    }
}

/// Handle keys in search mode; the list filters as you type
fn handle_search_mode<S: Storage>(app: &mut App<S>, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.exit_mode();
        }
        KeyCode::Enter | KeyCode::Down => app.exit_mode(),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) => app.search_insert(c),
        _ => {}
    }
    HandleResult::Continue
}

/// Handle keys in the add form and the row editor
fn handle_form_mode<S: Storage>(app: &mut App<S>, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => {
            app.exit_mode();
            app.clear_status();
        }
        KeyCode::Enter => {
            if app.mode == Mode::Editing {
                app.submit_edit();
            } else {
                app.submit_add();
            }
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.form.next_field(),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Char(c) => app.form.insert(c),
        _ => {}
    }
    HandleResult::Continue
}

/// Handle keys in the import prompt
fn handle_import_mode<S: Storage>(app: &mut App<S>, key: KeyEvent) -> HandleResult {
    match key.code {
        KeyCode::Esc => app.exit_mode(),
        KeyCode::Enter => {
            let path = app.import_path();
            app.exit_mode();
            if let Some(path) = path {
                return HandleResult::Import(path);
            }
        }
        KeyCode::Backspace => {
            app.import_input.pop();
        }
        KeyCode::Char(c) => app.import_input.push(c),
        _ => {}
    }
    HandleResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{Library, MemoryStorage, ViewQuery};

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) -> HandleResult {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App<MemoryStorage> {
        let mut library = Library::load(MemoryStorage::new());
        library.add("Dune", "Herbert").unwrap();
        library.add("Emma", "Austen").unwrap();
        App::new(library, ViewQuery::default(), Duration::from_millis(400), std::env::temp_dir())
    }

    #[test]
    fn test_add_flow_with_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Kindred");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Butler");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.library.len(), 3);
        assert_eq!(app.library.books()[2].title, "Kindred");
    }

    #[test]
    fn test_letters_in_form_are_text_not_commands() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "qdsJ");
        assert_eq!(app.mode, Mode::Adding);
        assert_eq!(app.form.title, "qdsJ");
    }

    #[test]
    fn test_edit_escape_cancels() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " Messiah");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.library.books()[0].title, "Dune");
    }

    #[test]
    fn test_search_escape_clears_filter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "emm");
        assert_eq!(app.visible().len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.visible().len(), 1);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible().len(), 2);
    }

    #[test]
    fn test_export_and_import_keys_return_actions() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('J')), HandleResult::Export(Format::Json));
        assert_eq!(press(&mut app, KeyCode::Char('C')), HandleResult::Export(Format::Csv));

        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "  list.csv ");
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            HandleResult::Import(PathBuf::from("list.csv"))
        );
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_help_is_dismissed_by_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        assert_eq!(press(&mut app, KeyCode::Char('q')), HandleResult::Continue);
        assert!(!app.show_help);
        assert_eq!(press(&mut app, KeyCode::Char('q')), HandleResult::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        let result = handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(result, HandleResult::Quit);
    }
}
