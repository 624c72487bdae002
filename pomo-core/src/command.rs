//! Grammar of the single-line command prompt
//!
//! ```text
//! s [minutes]      start a work session
//! b [minutes]      start a break
//! l [YYYY-MM-DD]   list work sessions for today or the given date
//! q                quit
//! ```

use crate::error::InputError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One parsed prompt line.
///
/// `StartWork`/`StartBreak` carry `None` when the configured default
/// should be used, which includes an explicit `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartWork(Option<u32>),
    StartBreak(Option<u32>),
    List,
    ListForDate(NaiveDate),
    /// Never produced by [`parse`]; the key-binding layer sends it.
    Stop,
    Quit,
    Invalid(InputError),
}

/// Parses a prompt line. Never fails: anything unrecognised becomes
/// [`Command::Invalid`].
pub fn parse(line: &str) -> Command {
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);
    if line == "q" {
        return Command::Quit;
    }

    let mut chars = line.chars();
    match chars.next() {
        Some('s') => match parse_minutes(chars.as_str()) {
            Ok(minutes) => Command::StartWork(minutes),
            Err(e) => Command::Invalid(e),
        },
        Some('b') => match parse_minutes(chars.as_str()) {
            Ok(minutes) => Command::StartBreak(minutes),
            Err(e) => Command::Invalid(e),
        },
        Some('l') => parse_list(chars.as_str()),
        _ => Command::Invalid(InputError::InvalidCommand),
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    // chrono accepts single-digit months and days; the prompt doesn't
    if s.len() != 10 {
        return Err(InputError::InvalidDate);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| InputError::InvalidDate)
}

fn parse_minutes(rest: &str) -> Result<Option<u32>, InputError> {
    if rest.is_empty() {
        return Ok(None);
    }
    let Some(arg) = rest.strip_prefix(' ') else {
        return Err(InputError::InvalidCommand);
    };

    let minutes: i64 = arg.trim().parse().map_err(|_| InputError::InvalidMinute)?;
    match minutes {
        0 => Ok(None),
        m if m < 0 => Err(InputError::InvalidMinute),
        m => u32::try_from(m)
            .map(Some)
            .map_err(|_| InputError::InvalidMinute),
    }
}

fn parse_list(rest: &str) -> Command {
    if rest.is_empty() {
        return Command::List;
    }
    let Some(arg) = rest.strip_prefix(' ') else {
        return Command::Invalid(InputError::InvalidCommand);
    };
    match parse_date(arg.trim()) {
        Ok(date) => Command::ListForDate(date),
        Err(e) => Command::Invalid(e),
    }
}
