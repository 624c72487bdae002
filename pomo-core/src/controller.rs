use crate::command::Command;
use crate::error::{InputError, StoreError};
use crate::report::DayReport;
use crate::store::SessionStore;
use crate::timer::{SessionKind, TickOutcome, TimerEngine, TimerStatus};
use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Minutes used when a start command gives none (or `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimerDefaults {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

/// What a command did.
#[derive(Debug)]
pub enum Outcome {
    Started(SessionKind),
    Stopped,
    Report(DayReport),
    Quit,
    /// Not accepted in the current state; nothing changed.
    Ignored,
    Invalid(InputError),
    StoreFailed(StoreError),
}

#[derive(Debug)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Set when a finished work session could not be written. The engine is
    /// idle regardless.
    pub error: Option<StoreError>,
}

/// Drives the timer from commands and ticks and records finished work
/// sessions in the store.
pub struct SessionController<S> {
    engine: TimerEngine,
    store: S,
    defaults: TimerDefaults,
}

impl<S: SessionStore> SessionController<S> {
    pub fn new(store: S, defaults: TimerDefaults) -> Self {
        Self {
            engine: TimerEngine::new(),
            store,
            defaults,
        }
    }

    /// Applies one command. While a session is running only `Stop` and
    /// `Quit` are accepted.
    pub fn handle(&mut self, command: Command, now: DateTime<Local>) -> Outcome {
        match command {
            Command::Quit => Outcome::Quit,
            Command::Stop => {
                if self.engine.stop() {
                    Outcome::Stopped
                } else {
                    Outcome::Ignored
                }
            }
            _ if !self.engine.is_idle() => {
                debug!(?command, "command ignored during session");
                Outcome::Ignored
            }
            Command::StartWork(minutes) => {
                let minutes = minutes.unwrap_or(self.defaults.work_minutes);
                self.start(SessionKind::Work, minutes, now)
            }
            Command::StartBreak(minutes) => {
                let minutes = minutes.unwrap_or(self.defaults.break_minutes);
                self.start(SessionKind::Break, minutes, now)
            }
            Command::List => self.report(now.date_naive()),
            Command::ListForDate(date) => self.report(date),
            Command::Invalid(e) => Outcome::Invalid(e),
        }
    }

    /// Advances the running session by one second, persisting it if this
    /// tick finished a work session.
    pub fn tick(&mut self, now: DateTime<Local>) -> TickReport {
        let outcome = self.engine.tick(now);
        let mut failure = None;
        if let TickOutcome::Finished {
            session: Some(session),
            ..
        } = &outcome
        {
            if let Err(e) = self.store.append(session) {
                error!("Failed to record session: {}", e);
                failure = Some(e);
            }
        }
        TickReport {
            outcome,
            error: failure,
        }
    }

    pub fn report(&self, date: NaiveDate) -> Outcome {
        match self.store.query_by_date(date) {
            Ok(sessions) => Outcome::Report(DayReport::new(date, sessions)),
            Err(e) => {
                warn!("Failed to load sessions: {}", e);
                Outcome::StoreFailed(e)
            }
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.engine.status()
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn start(&mut self, kind: SessionKind, minutes: u32, now: DateTime<Local>) -> Outcome {
        if self
            .engine
            .start(kind, Duration::minutes(i64::from(minutes)), now)
        {
            Outcome::Started(kind)
        } else {
            Outcome::Ignored
        }
    }
}
