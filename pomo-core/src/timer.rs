//! Countdown state machine
//!
//! `Idle -> Opening -> Active -> Closing -> Idle`. The engine never looks at
//! the clock on its own; it moves exactly one second per [`TimerEngine::tick`]
//! and only uses the `now` it is handed to stamp the session record.

use crate::store::Session;
use chrono::{DateTime, Duration, Local};
use std::fmt;
use tracing::{debug, info};

/// Pre-roll before the nominal countdown starts.
pub const OPENING_SECS: i64 = 3;
/// Grace window after the countdown reaches zero.
pub const CLOSING_SECS: i64 = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Opening,
    Active,
    Closing,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    #[default]
    Work,
    Break,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Work => f.write_str("Work"),
            SessionKind::Break => f.write_str("Break"),
        }
    }
}

/// Snapshot handed to the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerStatus {
    pub phase: Phase,
    pub kind: SessionKind,
    pub remaining: Duration,
    pub duration: Duration,
    pub percent: f64,
}

impl TimerStatus {
    /// Whole seconds left in the pre-roll. Only meaningful while opening.
    pub fn opening_secs_left(&self) -> i64 {
        (self.remaining - self.duration).num_seconds()
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session running; nothing happened.
    Idle,
    /// Countdown advanced; carries the phase after the tick.
    Running(Phase),
    /// Closing window elapsed and the engine is idle again. Work sessions
    /// carry the record to persist, breaks carry `None`.
    Finished {
        kind: SessionKind,
        session: Option<Session>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    phase: Phase,
    kind: SessionKind,
    duration: Duration,
    remaining: Duration,
    started_at: Option<DateTime<Local>>,
    percent: f64,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session. Returns `false` and changes nothing unless the
    /// engine is idle and `duration` is positive.
    pub fn start(&mut self, kind: SessionKind, duration: Duration, now: DateTime<Local>) -> bool {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "start ignored, session already running");
            return false;
        }
        if duration <= Duration::zero() {
            debug!(secs = duration.num_seconds(), "start ignored, non-positive duration");
            return false;
        }

        self.kind = kind;
        self.duration = duration;
        self.remaining = duration + Duration::seconds(OPENING_SECS);
        self.started_at = Some(now);
        self.percent = 0.0;
        self.phase = Phase::Opening;
        info!(%kind, minutes = duration.num_minutes(), "session opening");
        true
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        if self.phase == Phase::Idle {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining - Duration::seconds(1);

        match self.phase {
            Phase::Opening => {
                if self.remaining <= self.duration {
                    self.phase = Phase::Active;
                    debug!(kind = %self.kind, "session active");
                }
            }
            Phase::Active => {
                let remaining = self.remaining.num_milliseconds() as f64;
                let total = self.duration.num_milliseconds() as f64;
                self.percent = (1.0 - remaining / total).clamp(0.0, 1.0);
                if self.remaining <= Duration::zero() {
                    self.phase = Phase::Closing;
                    debug!(kind = %self.kind, "session closing");
                }
            }
            Phase::Closing => {
                if self.remaining <= -Duration::seconds(CLOSING_SECS) {
                    return self.finish(now);
                }
            }
            Phase::Idle => {}
        }

        TickOutcome::Running(self.phase)
    }

    /// Drops the running session without producing a record. Returns
    /// whether anything was running.
    pub fn stop(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        info!(kind = %self.kind, phase = ?self.phase, "session stopped");
        self.reset();
        true
    }

    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            phase: self.phase,
            kind: self.kind,
            remaining: self.remaining,
            duration: self.duration,
            percent: self.percent,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    fn finish(&mut self, now: DateTime<Local>) -> TickOutcome {
        let kind = self.kind;
        let session = match (kind, self.started_at) {
            (SessionKind::Work, Some(start)) => Some(Session::new(start, now, self.duration)),
            _ => None,
        };
        info!(%kind, minutes = self.duration.num_minutes(), "session finished");
        self.reset();
        TickOutcome::Finished { kind, session }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.remaining = Duration::zero();
        self.started_at = None;
        self.percent = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn started(kind: SessionKind, minutes: i64) -> TimerEngine {
        let mut engine = TimerEngine::new();
        assert!(engine.start(kind, Duration::minutes(minutes), at(0)));
        engine
    }

    #[test]
    fn start_enters_opening_with_pre_roll() {
        let engine = started(SessionKind::Work, 25);
        let status = engine.status();
        assert_eq!(status.phase, Phase::Opening);
        assert_eq!(status.remaining, Duration::seconds(25 * 60 + 3));
        assert_eq!(status.duration, Duration::minutes(25));
        assert_eq!(status.percent, 0.0);
        assert_eq!(status.opening_secs_left(), 3);
        assert_eq!(engine.started_at(), Some(at(0)));
    }

    #[test]
    fn second_start_is_ignored() {
        let mut engine = started(SessionKind::Work, 25);
        assert!(!engine.start(SessionKind::Break, Duration::minutes(5), at(1)));
        assert_eq!(engine.phase(), Phase::Opening);
        assert_eq!(engine.kind(), SessionKind::Work);
        assert_eq!(engine.duration(), Duration::minutes(25));
        assert_eq!(engine.started_at(), Some(at(0)));
    }

    #[test]
    fn zero_duration_start_is_ignored() {
        let mut engine = TimerEngine::new();
        assert!(!engine.start(SessionKind::Work, Duration::zero(), at(0)));
        assert!(engine.is_idle());
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.tick(at(1)), TickOutcome::Idle);
        assert!(engine.is_idle());
        assert_eq!(engine.remaining(), Duration::zero());
    }

    #[test]
    fn full_work_session_walks_every_phase() {
        let mut engine = started(SessionKind::Work, 25);
        let total = 25 * 60 + 3;

        for t in 1..=2 {
            assert_eq!(engine.tick(at(t)), TickOutcome::Running(Phase::Opening));
        }
        assert_eq!(engine.tick(at(3)), TickOutcome::Running(Phase::Active));
        assert_eq!(engine.percent(), 0.0);

        for t in 4..total {
            assert_eq!(engine.tick(at(t)), TickOutcome::Running(Phase::Active));
        }
        assert_eq!(engine.remaining(), Duration::seconds(1));

        assert_eq!(engine.tick(at(total)), TickOutcome::Running(Phase::Closing));
        assert_eq!(engine.remaining(), Duration::zero());
        assert_eq!(engine.percent(), 1.0);

        for t in 1..=3 {
            assert_eq!(
                engine.tick(at(total + t)),
                TickOutcome::Running(Phase::Closing)
            );
        }
        assert_eq!(engine.remaining(), Duration::seconds(-3));

        match engine.tick(at(total + 4)) {
            TickOutcome::Finished { kind, session } => {
                assert_eq!(kind, SessionKind::Work);
                let session = session.expect("work sessions produce a record");
                assert_eq!(session.start_time, at(0));
                assert_eq!(session.end_time, at(total + 4));
                assert_eq!(session.duration, Duration::minutes(25));
            }
            other => panic!("expected Finished, got {other:?}"),
        }
        assert!(engine.is_idle());
        assert_eq!(engine.tick(at(total + 5)), TickOutcome::Idle);
    }

    #[test]
    fn break_finishes_without_record() {
        let mut engine = started(SessionKind::Break, 1);
        let mut last = TickOutcome::Idle;
        for t in 1..=(60 + 3 + 4) {
            last = engine.tick(at(t));
        }
        assert_eq!(
            last,
            TickOutcome::Finished {
                kind: SessionKind::Break,
                session: None
            }
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn percent_never_decreases_while_active() {
        let mut engine = started(SessionKind::Work, 2);
        let mut previous = 0.0;
        for t in 1..=(120 + 3) {
            engine.tick(at(t));
            if engine.phase() == Phase::Active {
                assert!(engine.percent() >= previous);
                assert!(engine.percent() <= 1.0);
                previous = engine.percent();
            }
        }
        assert_eq!(engine.phase(), Phase::Closing);
        assert_eq!(engine.percent(), 1.0);
    }

    #[test]
    fn percent_tracks_elapsed_fraction() {
        let mut engine = started(SessionKind::Work, 1);
        for t in 1..=(3 + 30) {
            engine.tick(at(t));
        }
        assert!((engine.percent() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn stop_from_any_running_phase_returns_idle() {
        // opening, active, closing
        for ticks in [1, 10, 60 + 3 + 2] {
            let mut engine = started(SessionKind::Work, 1);
            for t in 1..=ticks {
                engine.tick(at(t));
            }
            assert!(!engine.is_idle());
            assert!(engine.stop());
            assert!(engine.is_idle());
            assert_eq!(engine.tick(at(ticks + 1)), TickOutcome::Idle);
        }
    }

    #[test]
    fn stop_when_idle_reports_nothing_stopped() {
        let mut engine = TimerEngine::new();
        assert!(!engine.stop());
    }

    #[test]
    fn engine_can_start_again_after_finishing() {
        let mut engine = started(SessionKind::Break, 1);
        for t in 1..=(60 + 7) {
            engine.tick(at(t));
        }
        assert!(engine.is_idle());
        assert!(engine.start(SessionKind::Work, Duration::minutes(1), at(100)));
        assert_eq!(engine.phase(), Phase::Opening);
    }
}
