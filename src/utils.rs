//! Small shared helpers: day-type/time-slot derivation for congestion
//! lookups, a cooperative cancellation token, and time formatting —
//! generalized from `raptor::utils`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

/// Day-type bucket used to key the congestion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Sat,
    Sun,
}

impl DayType {
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        match dt.weekday() {
            Weekday::Sat => DayType::Sat,
            Weekday::Sun => DayType::Sun,
            _ => DayType::Weekday,
        }
    }
}

/// Rounds a timestamp down to its containing 30-minute slot, returned as
/// minutes-since-midnight (0, 30, 60, ...).
pub fn time_slot(dt: NaiveDateTime) -> u16 {
    let minutes_since_midnight = dt.hour() * 60 + dt.minute();
    ((minutes_since_midnight / 30) * 30) as u16
}

pub fn get_time_str(minutes_from_midnight: f64) -> String {
    let total_minutes = minutes_from_midnight.round().max(0.0) as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{:02}:{:02}", hours, minutes)
}

/// A cooperative cancellation flag, checked between rounds and inside long
/// ride-expansion loops per spec.md §5. Cheap to clone and share across
/// threads; cancelling from one handle is visible to all clones.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn time_slot_rounds_down_to_thirty_minutes() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(8, 47, 0)
            .unwrap();
        assert_eq!(time_slot(dt), 480);
    }

    #[test]
    fn cancellation_token_is_shared_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
