//! Terminal management and main run loop

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use shelf_core::{ShelfConfig, Storage, ViewQuery};
use tracing::info;

use super::app::App;
use super::event::{handle_key, poll_event, HandleResult};
use super::ui;
use crate::commands::Context;

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

fn initial_query(config: &ShelfConfig) -> ViewQuery {
    ViewQuery::new("", config.view.sort_field, config.view.sort_order)
}

/// Run the TUI application
pub fn run(ctx: &Context) -> Result<()> {
    let library = ctx
        .open_library()
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    let mut app = App::new(
        library,
        initial_query(&ctx.config),
        Duration::from_millis(ctx.config.ui.delete_fade_ms),
        &ctx.data_dir,
    );
    info!(books = app.library.len(), "tui started");

    let mut terminal = init_terminal()?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal (even if loop failed)
    let restored = restore_terminal(&mut terminal);

    finish(&mut app, result, restored)
}

/// Apply deletes still fading at exit, then report the loop error first
/// and the restore error second.
fn finish<S: Storage>(app: &mut App<S>, result: Result<()>, restored: Result<()>) -> Result<()> {
    app.flush_deletes();
    result.and(restored)
}

/// Main event loop
fn run_loop<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events (with 100ms timeout so fades finish on time)
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match handle_key(app, key) {
                HandleResult::Quit => break,
                HandleResult::Continue => {}
                HandleResult::Export(format) => {
                    app.export(format);
                }
                HandleResult::Import(path) => {
                    app.set_status(format!("Importing {}...", path.display()));
                    terminal.draw(|frame| ui::render(frame, app))?;
                    app.import(&path);
                }
            }
        }
    }

    Ok(())
}
