use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use pomo_core::command::parse_date;
use pomo_core::{group_by_day, paths, DayReport, JsonlStore, SessionStore};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pomoctl")]
#[command(about = "Inspect the pomo session log", long_about = None)]
struct Cli {
    /// Session log to read instead of the default location
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List work sessions for today
    List {
        /// Day to list instead of today (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// List every day in the log
        #[arg(short, long, conflicts_with = "date")]
        all: bool,
    },
    /// Print the session log path
    Path,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let path = match cli.file {
        Some(path) => path,
        None => paths::session_log().context("Could not determine data directory")?,
    };
    let store = JsonlStore::new(path);
    debug!(path = %store.path().display(), "using session log");

    match cli.command {
        Commands::Path => println!("{}", store.path().display()),
        Commands::List { date, all } => {
            let today = Local::now().date_naive();
            let reports = select_reports(&store, date, all, today)?;
            print!("{}", render(&reports));
        }
    }

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_env("POMO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn select_reports<S: SessionStore>(
    store: &S,
    date: Option<NaiveDate>,
    all: bool,
    today: NaiveDate,
) -> Result<Vec<DayReport>> {
    if all {
        let sessions = store.load().context("Failed to load sessions")?;
        return Ok(group_by_day(&sessions));
    }
    let date = date.unwrap_or(today);
    let sessions = store
        .query_by_date(date)
        .context("Failed to load sessions")?;
    Ok(vec![DayReport::new(date, sessions)])
}

fn render(reports: &[DayReport]) -> String {
    let mut out = String::new();
    if reports.is_empty() {
        out.push_str("No work sessions recorded.\n");
        return out;
    }
    for report in reports {
        if report.is_empty() {
            let _ = writeln!(out, "No work sessions on {}.", report.date.format("%Y-%m-%d"));
            continue;
        }
        let _ = writeln!(
            out,
            "{}  {} sessions  {} min",
            report.date.format("%Y-%m-%d"),
            report.sessions.len(),
            report.total.num_minutes()
        );
        for session in &report.sessions {
            let _ = writeln!(
                out,
                "  {} - {}  {} min",
                session.start_time.format("%H:%M"),
                session.end_time.format("%H:%M"),
                session.duration.num_minutes()
            );
        }
    }
    out
}
