//! Core of the pomo focus timer
//!
//! Everything with real state lives here: the command grammar typed at the
//! prompt, the countdown state machine, the append-only log of finished work
//! sessions and the controller tying them together. The terminal app and
//! `pomoctl` are thin shells around this crate.

pub mod command;
pub mod controller;
pub mod error;
pub mod paths;
pub mod report;
pub mod store;
pub mod timer;

pub use command::{parse, Command};
pub use controller::{Outcome, SessionController, TickReport, TimerDefaults};
pub use error::{InputError, StoreError};
pub use report::{group_by_day, DayReport};
pub use store::{JsonlStore, MemoryStore, Session, SessionStore};
pub use timer::{Phase, SessionKind, TickOutcome, TimerEngine, TimerStatus};
