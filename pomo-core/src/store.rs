use crate::error::StoreError;
use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A finished work session. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    /// Nominal length the timer was set to, not wall-clock elapsed time.
    #[serde(rename = "duration_secs", with = "duration_secs")]
    pub duration: Duration,
}

impl Session {
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, duration: Duration) -> Self {
        Self {
            start_time,
            end_time,
            duration,
        }
    }

    /// Calendar day the session started on.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Duration::try_seconds(secs).ok_or_else(|| de::Error::custom("duration out of range"))
    }
}

/// Append-only log of finished work sessions, oldest first.
pub trait SessionStore {
    /// Every stored session in append order. A store that was never
    /// written to is empty, not an error.
    fn load(&self) -> Result<Vec<Session>, StoreError>;

    fn append(&mut self, session: &Session) -> Result<(), StoreError>;

    /// Sessions whose start falls on `date`, in append order.
    fn query_by_date(&self, date: NaiveDate) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|session| session.date() == date)
            .collect())
    }
}

/// Session log kept as JSON Lines, one record per line.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for JsonlStore {
    fn load(&self) -> Result<Vec<Session>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session log yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut sessions = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let session = serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                line: idx + 1,
                source,
            })?;
            sessions.push(session);
        }
        debug!(path = %self.path.display(), count = sessions.len(), "loaded sessions");
        Ok(sessions)
    }

    fn append(&mut self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut line = serde_json::to_string(session)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), start = %session.start_time, "session recorded");
        Ok(())
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Vec<Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.sessions.clone())
    }

    fn append(&mut self, session: &Session) -> Result<(), StoreError> {
        self.sessions.push(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(y: i32, m: u32, d: u32, hour: u32, minutes: i64) -> Session {
        let start = Local.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap();
        let duration = Duration::minutes(minutes);
        Session::new(start, start + duration + Duration::seconds(7), duration)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("sessions.jsonl"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(dir.path().join("nested/sessions.jsonl"));
        let first = session(2024, 3, 7, 9, 25);
        let second = session(2024, 3, 7, 10, 50);

        store.append(&first).unwrap();
        store.append(&second).unwrap();

        assert_eq!(store.load().unwrap(), vec![first, second]);
    }

    #[test]
    fn append_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let first = session(2024, 3, 7, 9, 25);
        let second = session(2024, 3, 8, 9, 25);

        JsonlStore::new(&path).append(&first).unwrap();
        let mut reopened = JsonlStore::new(&path);
        reopened.append(&second).unwrap();

        let loaded = JsonlStore::new(&path).load().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn append_does_not_rewrite_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let mut store = JsonlStore::new(&path);
        store.append(&session(2024, 3, 7, 9, 25)).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        store.append(&session(2024, 3, 7, 11, 25)).unwrap();
        let after = fs::read_to_string(&path).unwrap();

        assert!(after.starts_with(&before));
        assert_eq!(after.lines().count(), 2);
    }

    #[test]
    fn records_store_nominal_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        JsonlStore::new(&path)
            .append(&session(2024, 3, 7, 9, 25))
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"duration_secs\":1500"));
    }

    #[test]
    fn corrupt_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let mut store = JsonlStore::new(&path);
        store.append(&session(2024, 3, 7, 9, 25)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        match store.load() {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");
        let mut store = JsonlStore::new(&path);
        store.append(&session(2024, 3, 7, 9, 25)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file).unwrap();
        store.append(&session(2024, 3, 7, 10, 25)).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn query_by_date_filters_on_start_day() {
        let mut store = MemoryStore::new();
        let a = session(2024, 3, 6, 22, 25);
        let b = session(2024, 3, 7, 9, 25);
        let c = session(2024, 3, 7, 14, 50);
        for s in [&a, &b, &c] {
            store.append(s).unwrap();
        }

        assert_eq!(store.query_by_date(date(2024, 3, 7)).unwrap(), vec![b, c]);
        assert_eq!(store.query_by_date(date(2024, 3, 6)).unwrap(), vec![a]);
        assert!(store.query_by_date(date(2024, 3, 8)).unwrap().is_empty());
    }

    #[test]
    fn query_by_date_matches_load_subset_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(dir.path().join("sessions.jsonl"));
        for s in [
            session(2024, 1, 1, 8, 25),
            session(2024, 1, 2, 8, 25),
            session(2024, 1, 2, 9, 25),
        ] {
            store.append(&s).unwrap();
        }

        let day = date(2024, 1, 2);
        let expected: Vec<_> = store
            .load()
            .unwrap()
            .into_iter()
            .filter(|s| s.date() == day)
            .collect();
        assert_eq!(store.query_by_date(day).unwrap(), expected);
        assert_eq!(expected.len(), 2);
    }
}
