//! Due-date scheduling for balance entries.
//!
//! An entry runs either every day or on a fixed day of the month. Days past
//! the end of a short month clamp to that month's last day, so a `31` entry
//! still fires in February instead of silently skipping the whole month.

use chrono::{Datelike, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::BalanceEntry;

/// Recurrence rule for a tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDay {
    Daily,
    DayOfMonth(u32),
}

impl ScheduleDay {
    /// Whether an entry with this schedule should run on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        match *self {
            ScheduleDay::Daily => true,
            ScheduleDay::DayOfMonth(day) => {
                let last = days_in_month(today.year(), today.month());
                today.day() == day || (day > last && today.day() == last)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Day(u32),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Day(day) => Ok(ScheduleDay::DayOfMonth(day)),
            Raw::Word(word) if word.eq_ignore_ascii_case("daily") => Ok(ScheduleDay::Daily),
            Raw::Word(word) => Err(D::Error::custom(format!(
                "invalid schedule_day '{word}': expected a day 1-31 or \"daily\""
            ))),
        }
    }
}

impl Serialize for ScheduleDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            ScheduleDay::Daily => serializer.serialize_str("daily"),
            ScheduleDay::DayOfMonth(day) => serializer.serialize_u32(day),
        }
    }
}

/// Due entries for `today` with their declaration indices, in declaration
/// order.
pub fn due_entries(entries: &[BalanceEntry], today: NaiveDate) -> Vec<(usize, &BalanceEntry)> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.schedule_day.is_due(today))
        .collect()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_day_of_month_matches_exact_day() {
        let schedule = ScheduleDay::DayOfMonth(5);
        assert!(schedule.is_due(date(2024, 3, 5)));
        assert!(!schedule.is_due(date(2024, 3, 4)));
        assert!(!schedule.is_due(date(2024, 3, 6)));
    }

    #[test]
    fn test_daily_is_always_due() {
        let schedule = ScheduleDay::Daily;
        assert!(schedule.is_due(date(2024, 3, 5)));
        assert!(schedule.is_due(date(2024, 2, 29)));
    }

    #[test]
    fn test_day_31_clamps_to_last_day_of_short_month() {
        let schedule = ScheduleDay::DayOfMonth(31);
        assert!(schedule.is_due(date(2024, 4, 30)));
        assert!(!schedule.is_due(date(2024, 4, 29)));
        // Only once per month: no other April day qualifies.
        for day in 1..30 {
            assert!(!schedule.is_due(date(2024, 4, day)));
        }
    }

    #[test]
    fn test_day_31_fires_on_leap_february_last_day() {
        let schedule = ScheduleDay::DayOfMonth(31);
        assert!(schedule.is_due(date(2024, 2, 29)));
        assert!(!schedule.is_due(date(2024, 2, 28)));
    }

    #[test]
    fn test_day_30_clamps_in_regular_february() {
        let schedule = ScheduleDay::DayOfMonth(30);
        assert!(schedule.is_due(date(2023, 2, 28)));
        assert!(!schedule.is_due(date(2023, 2, 27)));
    }

    #[test]
    fn test_day_31_in_long_month_is_exact() {
        let schedule = ScheduleDay::DayOfMonth(31);
        assert!(schedule.is_due(date(2024, 1, 31)));
        assert!(!schedule.is_due(date(2024, 1, 30)));
    }

    #[test]
    fn test_deserializes_day_and_daily() {
        #[derive(Deserialize)]
        struct Doc {
            schedule_day: ScheduleDay,
        }

        let doc: Doc = toml::from_str("schedule_day = 15").expect("day parses");
        assert_eq!(doc.schedule_day, ScheduleDay::DayOfMonth(15));

        let doc: Doc = toml::from_str("schedule_day = \"daily\"").expect("daily parses");
        assert_eq!(doc.schedule_day, ScheduleDay::Daily);

        let err = toml::from_str::<Doc>("schedule_day = \"weekly\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
