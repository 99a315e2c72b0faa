//! liferec TUI
//!
//! Terminal user interface for browsing and editing life records.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Records list, oldest first
//! - Right: Detail view of the selected record
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down (scrolls in the detail pane)
//! - gg/G: Jump to first/last
//! - h/l, ←/→ or Tab: Switch focus between panes
//! - q or Ctrl-C: Quit
//!
//! ## Commands
//!
//! - a: Add record in $EDITOR
//! - e: Edit selected record in $EDITOR
//! - d: Delete selected record (asks y/n)
//! - ?: Help

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use liferec_core::{Config, RecordFields, RecordStore};

use app::{App, InputMode, PENDING_G_TIMEOUT};

use crate::editor;

/// Run the TUI application
pub fn run(config: &Config, file: Option<&Path>) -> Result<()> {
    // Open before touching the terminal so errors print normally
    let mut store = RecordStore::open(file, config)?;

    // File-based, only if LIFEREC_LOG is set
    init_tui_logging(config);
    info!("TUI started on {:?}", store.path());

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(&store);

    let result = run_app(&mut terminal, &mut app, &mut store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut RecordStore,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Any key dismisses the error modal
        if app.has_error() {
            app.clear_error();
            continue;
        }

        // Any key dismisses help
        if app.show_help {
            app.show_help = false;
            continue;
        }

        match app.input_mode {
            InputMode::Normal => {
                handle_normal_mode(terminal, app, store, key.code, key.modifiers)?
            }
            InputMode::ConfirmDelete => handle_confirm_delete(app, store, key.code),
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exiting");
    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut RecordStore,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j' | 'k' | 'h' | 'l' | 'g' | 'G')
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
    ) {
        app.status_message = None;
    }

    if let Some(time) = app.pending_g {
        if time.elapsed() > PENDING_G_TIMEOUT {
            app.pending_g = None;
        }
    }

    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        KeyCode::Char('h' | 'l') | KeyCode::Left | KeyCode::Right => app.switch_pane(),
        KeyCode::Tab | KeyCode::BackTab => app.switch_pane(),

        KeyCode::Char('a') => {
            let edited = run_editor(terminal, &editor::new_record_template())?;
            let outcome = edited.and_then(|fields| app.add_record(store, fields));
            if let Err(e) = outcome {
                app.set_error(format!("Failed to add record: {:#}", e));
            }
        }
        KeyCode::Char('e') => {
            let Some(record) = app.current_record().cloned() else {
                app.set_status("No record selected");
                return Ok(());
            };
            let edited = run_editor(terminal, &editor::edit_record_template(&record))?;
            let outcome = edited.and_then(|fields| app.edit_current(store, fields));
            if let Err(e) = outcome {
                app.set_error(format!("Failed to update record: {:#}", e));
            }
        }
        KeyCode::Char('d') => app.request_delete(),

        KeyCode::Char('?') => app.toggle_help(),

        // Vim navigation: G (go to last)
        KeyCode::Char('G') => {
            app.pending_g = None;
            app.move_to_last();
        }

        // Vim navigation: g (start of gg sequence)
        KeyCode::Char('g') => {
            if app.pending_g.take().is_some() {
                app.move_to_first();
            } else {
                app.pending_g = Some(Instant::now());
            }
        }

        _ => {
            app.pending_g = None;
        }
    }

    Ok(())
}

/// Handle the y/n answer to a delete prompt
fn handle_confirm_delete(app: &mut App, store: &mut RecordStore, code: KeyCode) {
    match code {
        KeyCode::Char('y' | 'Y') => {
            if let Err(e) = app.delete_current(store) {
                app.set_error(format!("Failed to delete record: {:#}", e));
            }
        }
        _ => {
            app.exit_input_mode();
            app.set_status("Every record matters! Nothing was deleted.");
        }
    }
}

/// Suspend the TUI, edit `template` in $EDITOR, then restore the TUI
///
/// The outer result fails only if the terminal cannot be restored; editor
/// failures come back in the inner result.
fn run_editor<B: Backend>(
    terminal: &mut Terminal<B>,
    template: &str,
) -> Result<Result<RecordFields>> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(cursor::Show)?;

    let edited = editor::edit_record(template);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    Ok(edited)
}

/// Initialize file-based logging for the TUI
///
/// Only initializes if LIFEREC_LOG environment variable is set.
/// Logs to `log_file` from config, or `debug.log` in the data directory.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LIFEREC_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("liferec_core={},liferec={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();
}
