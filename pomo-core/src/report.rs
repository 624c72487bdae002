use crate::store::Session;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Work sessions of a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
    /// Sum of nominal durations.
    pub total: Duration,
}

impl DayReport {
    pub fn new(date: NaiveDate, sessions: Vec<Session>) -> Self {
        let total = sessions
            .iter()
            .fold(Duration::zero(), |acc, s| acc + s.duration);
        Self {
            date,
            sessions,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Splits a log into one report per day, oldest day first. Sessions keep
/// their relative order inside a day.
pub fn group_by_day(sessions: &[Session]) -> Vec<DayReport> {
    let mut days: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
    for session in sessions {
        days.entry(session.date()).or_default().push(session.clone());
    }
    days.into_iter()
        .map(|(date, sessions)| DayReport::new(date, sessions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn session(d: u32, hour: u32, minutes: i64) -> Session {
        let start = Local.with_ymd_and_hms(2024, 5, d, hour, 0, 0).unwrap();
        let duration = Duration::minutes(minutes);
        Session::new(start, start + duration, duration)
    }

    #[test]
    fn totals_nominal_durations() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let report = DayReport::new(date, vec![session(1, 9, 25), session(1, 10, 50)]);
        assert_eq!(report.total, Duration::minutes(75));
        assert!(!report.is_empty());
    }

    #[test]
    fn empty_day_has_zero_total() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let report = DayReport::new(date, Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.total, Duration::zero());
    }

    #[test]
    fn groups_by_start_day_in_date_order() {
        let log = vec![session(2, 9, 25), session(1, 9, 25), session(2, 14, 5)];
        let days = group_by_day(&log);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(days[0].sessions, vec![log[1].clone()]);
        assert_eq!(days[1].sessions, vec![log[0].clone(), log[2].clone()]);
        assert_eq!(days[1].total, Duration::minutes(30));
    }

    #[test]
    fn empty_log_has_no_days() {
        assert!(group_by_day(&[]).is_empty());
    }
}
