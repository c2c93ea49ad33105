//! Shelf TUI
//!
//! Terminal user interface for searching the catalog and managing the
//! personal library.
//!
//! ## Layout
//!
//! - Top: search box
//! - Left: book list (✓ marks books in the user's library)
//! - Right: user and focused-book details
//!
//! ## Keys
//!
//! - /: Search the catalog
//! - p: Search my library (logged in only)
//! - j/k or ↑/↓: Move focus through the books, wrapping at both ends
//! - Esc: Move focus back to the search box
//! - Enter: Add or remove the focused book
//! - L: Login popup (Tab switches fields, Enter logs in, Ctrl-R registers)
//! - O: Log out
//! - ?: Help
//! - q: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use shelf_core::{Backend as LibraryBackend, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, InputMode, SearchTarget};

use crate::commands;

/// Run the TUI application
pub fn run(config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SHELF_LOG is set)
    init_tui_logging(config);

    let ctx = commands::open_context(config)?;
    let mut app = App::new(ctx);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<T: ratatui::backend::Backend, B: LibraryBackend>(
    terminal: &mut Terminal<T>,
    app: &mut App<B>,
) -> Result<()> {
    // Auto-login happens once, with the first frame already on screen
    app.busy = Some("Logging in...");
    terminal.draw(|frame| ui::draw(frame, app))?;
    app.start();
    app.busy = None;

    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Network calls block; say so before making them
        if let Some(label) = busy_label(app, key) {
            app.busy = Some(label);
            terminal.draw(|frame| ui::draw(frame, app))?;
        }

        handle_key(app, key);
        app.busy = None;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Label for keys that trigger a backend call
fn busy_label<B: LibraryBackend>(app: &App<B>, key: KeyEvent) -> Option<&'static str> {
    match (app.input_mode, key.code) {
        (InputMode::Search, KeyCode::Enter) => Some("Searching..."),
        (InputMode::Login, KeyCode::Enter) => Some("Logging in..."),
        (InputMode::Login, KeyCode::Char('r')) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some("Registering...")
        }
        (InputMode::Normal, KeyCode::Enter) if app.focused_index().is_some() => {
            Some("Updating library...")
        }
        _ => None,
    }
}

fn handle_key<B: LibraryBackend>(app: &mut App<B>, key: KeyEvent) {
    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key.code, key.modifiers),
        InputMode::Search => handle_search_mode(app, key.code),
        InputMode::Login => handle_login_mode(app, key.code, key.modifiers),
    }
}

/// Handle key events in normal mode
fn handle_normal_mode<B: LibraryBackend>(app: &mut App<B>, code: KeyCode, modifiers: KeyModifiers) {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down
    ) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('j') | KeyCode::Down => app.focus_next(),
        KeyCode::Char('k') | KeyCode::Up => app.focus_previous(),
        KeyCode::Esc => app.leave_list(),

        KeyCode::Enter => app.toggle_focused(),

        KeyCode::Char('/') => app.enter_search_mode(SearchTarget::Catalog),
        KeyCode::Char('p') => app.enter_search_mode(SearchTarget::Library),

        KeyCode::Char('L') => app.open_login(),
        KeyCode::Char('O') => app.logout(),

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key events while typing a search
fn handle_search_mode<B: LibraryBackend>(app: &mut App<B>, code: KeyCode) {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Handle key events in the login popup
fn handle_login_mode<B: LibraryBackend>(app: &mut App<B>, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Tab | KeyCode::BackTab => app.switch_login_field(),
        KeyCode::Enter => app.submit_login(false),
        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => app.submit_login(true),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if SHELF_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("shelf_core={0},shelf_cli={0}", log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
