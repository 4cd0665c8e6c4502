//! Lunaris - Entry Point
//!
//! Initializes logging and the terminal, opens the account store, and runs
//! the dashboard loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use std::fs::OpenOptions;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};

use lunaris::data::{DataManager, DEFAULT_DATA_DIR};
use lunaris::economy::UserId;
use lunaris::save::JsonFileStore;
use lunaris::ui::App;

/// How long to wait for input before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    // Log to a file so output doesn't interfere with the TUI
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("lunaris.log")
        .context("failed to open lunaris.log")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .target(env_logger::Target::Pipe(Box::new(log_file)))
    .init();

    log::info!("Starting Lunaris v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = std::env::var_os("LUNARIS_DATA").map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let store_dir = std::env::var_os("LUNARIS_STORE").map(PathBuf::from)
        .unwrap_or_else(JsonFileStore::default_dir);
    let user = std::env::var("LUNARIS_USER").unwrap_or_else(|_| "local".to_string());

    let data = DataManager::load(&data_dir);
    let store = JsonFileStore::open(&store_dir)
        .with_context(|| format!("failed to open account store at {:?}", store_dir))?;
    let mut app = App::new(store, data, UserId::new(user))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Lunaris exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Lunaris shut down cleanly");
    result
}

/// Main dashboard loop
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<JsonFileStore>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press && app.handle_input(key)? {
                    break;
                }
            }
        }
    }

    Ok(())
}
