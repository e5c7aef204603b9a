//! UI rendering using ratatui

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use shelf_core::Storage;

use super::app::{App, BookForm, FormField, Mode};

/// Primary accent color
const ACCENT: Color = Color::Cyan;
/// Secondary color for less important elements
const SECONDARY: Color = Color::DarkGray;
/// Highlight color for selected items
const HIGHLIGHT: Color = Color::Yellow;
/// Success color
const SUCCESS: Color = Color::Green;
/// Dim text color
const DIM: Color = Color::Rgb(100, 100, 100);

pub const HELP_TEXT: &str = "\
j/k, Up/Down   move selection
g/G            first / last row
a              add a book
e, Enter       edit the selected row (Enter saves, Esc cancels)
d, Del         delete the selected row
/              search title and author (Esc clears)
s              sort by title / author
o              ascending / descending
J / C          export JSON / CSV to the data directory
i              import a .json or .csv file
?              this help
q, Ctrl+C      quit";

/// Render the entire UI
pub fn render<S: Storage>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header: search + sort
            Constraint::Min(5),    // Book rows
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    match app.mode {
        Mode::Adding => render_form_popup(frame, " Add book ", &app.form),
        Mode::Importing => render_import_prompt(frame, app),
        _ => {}
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Search field plus the current sort
fn render_header<S: Storage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let searching = app.mode == Mode::Search;
    let border_style = if searching {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(SECONDARY)
    };

    let block = Block::default()
        .title(" Shelf ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(border_style);

    let search = if searching {
        Span::raw(format!("{}|", app.query.text))
    } else if app.query.text.is_empty() {
        Span::styled("press / to search", Style::default().fg(DIM))
    } else {
        Span::raw(app.query.text.clone())
    };

    let line = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(ACCENT)),
        search,
        Span::raw("   "),
        Span::styled("Sort: ", Style::default().fg(ACCENT)),
        Span::raw(format!("{} ({})", app.query.field, app.query.order)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// One row per visible book; the edited row shows its inputs inline
fn render_list<S: Storage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let visible = app.visible();

    let title = if app.query.text.is_empty() {
        format!(" Books ({}) ", app.library.len())
    } else {
        format!(" Books ({} of {}) ", visible.len(), app.library.len())
    };

    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let height = block.inner(area).height as usize;
    let offset = app.selected_index.saturating_sub(height.saturating_sub(1));

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(row, entry)| {
            let is_selected = row == app.selected_index;
            let book = entry.book;

            if app.editing == Some(book.id) {
                return ListItem::new(form_line(&app.form, true));
            }

            let style = if app.is_fading(book.id) {
                Style::default()
                    .fg(DIM)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if is_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let actions = if is_selected { "   [e]dit [d]elete" } else { "" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} by {}", book.title, book.author), style),
                Span::styled(actions, Style::default().fg(DIM)),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        let placeholder = if app.library.is_empty() {
            "  No books yet. Press 'a' to add one."
        } else {
            "  No matches"
        };
        List::new(vec![ListItem::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(DIM),
        )))])
        .block(block)
    } else {
        List::new(items).block(block)
    };

    frame.render_widget(list, area);
}

/// Title and author inputs on one line, the focused one with a cursor
fn form_line(form: &BookForm, save_hint: bool) -> Line<'static> {
    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Black).bg(HIGHLIGHT)
        } else {
            Style::default().fg(HIGHLIGHT)
        };
        let cursor = if focused { "|" } else { "" };
        vec![
            Span::styled(format!("{label}: "), Style::default().fg(ACCENT)),
            Span::styled(format!("[{value}{cursor}]"), style),
            Span::raw("  "),
        ]
    };

    let mut spans = field("Title", &form.title, form.focus == FormField::Title);
    spans.extend(field("Author", &form.author, form.focus == FormField::Author));
    if save_hint {
        spans.push(Span::styled("Enter:save  Esc:cancel", Style::default().fg(DIM)));
    }
    Line::from(spans)
}

/// Render the status bar
fn render_status_bar<S: Storage>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let mode_indicator = match app.mode {
        Mode::Normal => Span::styled(" NORMAL ", Style::default().bg(ACCENT).fg(Color::Black)),
        Mode::Search => {
            Span::styled(" SEARCH ", Style::default().bg(Color::Magenta).fg(Color::Black))
        }
        Mode::Adding => Span::styled(" ADD ", Style::default().bg(SUCCESS).fg(Color::Black)),
        Mode::Editing => Span::styled(" EDIT ", Style::default().bg(SUCCESS).fg(Color::Black)),
        Mode::Importing => {
            Span::styled(" IMPORT ", Style::default().bg(HIGHLIGHT).fg(Color::Black))
        }
    };

    let help_text = match app.mode {
        Mode::Normal => "a:add  e:edit  d:delete  /:search  s/o:sort  J/C:export  i:import  ?:help  q:quit",
        Mode::Search => "Type to filter  Enter:keep  Esc:clear",
        Mode::Adding | Mode::Editing => "Tab:next field  Enter:save  Esc:cancel",
        Mode::Importing => "Path to .json or .csv  Enter:import  Esc:cancel",
    };

    let status = app.status_message.as_deref().unwrap_or("");

    let line = Line::from(vec![
        mode_indicator,
        Span::raw(" "),
        Span::styled(help_text, Style::default().fg(DIM)),
        Span::raw(" "),
        Span::styled(status, Style::default().fg(HIGHLIGHT)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Add form overlay
fn render_form_popup(frame: &mut Frame, title: &str, form: &BookForm) {
    let popup_area = centered(frame.area(), 70, 4);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title.to_string())
        .title_style(Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUCCESS));

    let paragraph = Paragraph::new(vec![
        form_line(form, false),
        Line::from(Span::styled(
            "Tab:next field  Enter:save  Esc:cancel",
            Style::default().fg(DIM),
        )),
    ])
    .block(block);

    frame.render_widget(paragraph, popup_area);
}

/// Import path prompt overlay
fn render_import_prompt<S: Storage>(frame: &mut Frame, app: &App<S>) {
    let popup_area = centered(frame.area(), 60, 3);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Import file (.json / .csv) ")
        .title_style(Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HIGHLIGHT));

    let paragraph = Paragraph::new(format!("{}|", app.import_input)).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let lines = HELP_TEXT.lines().count() as u16;
    let popup_area = centered(frame.area(), 70, lines + 2);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help (press any key to close) ")
        .title_style(Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SUCCESS));

    let paragraph = Paragraph::new(HELP_TEXT)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, popup_area);
}
