//! headline-tui binary: configuration, logging, terminal setup and the
//! event loop.  See the library crate docs for the architecture.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use headline_tui::app::App;
use headline_tui::config::{Cli, Config};
use headline_tui::source::NewsApiSource;
use headline_tui::store::FileSnapshotStore;
use headline_tui::{fetch, input, ui};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send logs to a file; stdout belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir: {}", config.data_dir.display()))?;
    let log_path = config.log_path();
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("headline_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- configuration and logging -------------------------------------------
    let config = Config::from_cli(Cli::parse())?;
    init_logging(&config)?;
    tracing::info!(topic = %config.topic, data_dir = %config.data_dir.display(), "starting");
    if config.api_key.is_empty() {
        tracing::warn!("no API key configured (set NEWS_API_KEY or pass --api-key)");
    }

    // -- collaborators -------------------------------------------------------
    let source = NewsApiSource::new(&config.endpoint, &config.api_key, config.timeout())
        .context("Failed to build HTTP client")?;
    let store = FileSnapshotStore::new(&config.data_dir, &config.snapshot_key);
    tracing::info!(path = %store.path().display(), "using snapshot");
    let fetcher = fetch::spawn(Box::new(source));

    install_panic_hook();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(
        Box::new(store),
        fetcher,
        config.query(),
        config.reveal_interval(),
    );
    app.start();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply finished fetches and fire the reveal timer.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick(Instant::now());

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("shutting down");
    // `app` (fetch worker handle, reveal timer) and then `guard` are dropped
    // here, stopping the worker and restoring the terminal.
    Ok(())
}
