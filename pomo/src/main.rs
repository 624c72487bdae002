use anyhow::{anyhow, Context, Result};
use chrono::Local;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use pomo_core::{paths, JsonlStore, SessionController, SessionStore};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod ui;

use app::App;

const TICK: Duration = Duration::from_secs(1);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    if let Some(path) = paths::trace_log() {
        if let Err(e) = setup_tracing(&path) {
            eprintln!("Logging disabled: {:#}", e);
        }
    }

    let store = JsonlStore::new(config.session_log_path()?);
    match store.load() {
        Ok(sessions) => info!(path = %store.path().display(), count = sessions.len(), "session log ready"),
        Err(e) => warn!("Session log unreadable: {}", e),
    }
    let app = App::new(SessionController::new(store, config.timer), config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Single-threaded event loop: every tick or key is handled to completion
/// before the next one is taken.
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = ticker();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(Local::now()),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, Local::now());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => return Ok(()),
            },
        }

        if app.take_ticker_restart() {
            ticker.reset();
        }
        if app.should_quit {
            info!("quit requested");
            return Ok(());
        }
    }
}

/// One tick per second, first one a full second out. Late ticks are not
/// replayed; the countdown drifts instead.
fn ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Logs go to a file: the terminal belongs to the UI.
fn setup_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;
    let filter = EnvFilter::try_from_env("POMO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
