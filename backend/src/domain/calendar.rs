//! Calendar-day timestamps for the marked days of a member.
//!
//! A day is stored as the epoch seconds of its UTC midnight, so toggling a
//! date twice lands on the same value regardless of the time of day it was
//! picked at.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeSet;

/// Epoch seconds of `date` at UTC midnight
pub fn day_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Calendar day a stored timestamp falls on, `None` when out of range
pub fn date_of(timestamp: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Add `date` when it is not marked yet, remove it otherwise.
///
/// Stored values that are not exactly a midnight still match their day.
/// Returns whether the day is marked afterwards.
pub fn toggle_date(selected_dates: &mut BTreeSet<i64>, date: NaiveDate) -> bool {
    let before = selected_dates.len();
    selected_dates.retain(|&ts| date_of(ts) != Some(date));
    if selected_dates.len() < before {
        return false;
    }
    selected_dates.insert(day_timestamp(date));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_timestamp_is_utc_midnight() {
        assert_eq!(day_timestamp(date(1970, 1, 2)), 86_400);
        assert_eq!(day_timestamp(date(2023, 11, 14)), 1_699_920_000);
        assert_eq!(date_of(1_699_920_000), Some(date(2023, 11, 14)));
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut dates = BTreeSet::new();

        assert!(toggle_date(&mut dates, date(2024, 5, 1)));
        assert_eq!(dates, BTreeSet::from([day_timestamp(date(2024, 5, 1))]));

        assert!(!toggle_date(&mut dates, date(2024, 5, 1)));
        assert!(dates.is_empty());
    }

    #[test]
    fn test_toggle_matches_non_midnight_values() {
        let noon = day_timestamp(date(2024, 5, 1)) + 12 * 3600;
        let mut dates = BTreeSet::from([noon]);

        assert!(!toggle_date(&mut dates, date(2024, 5, 1)));
        assert!(dates.is_empty());
    }
}
