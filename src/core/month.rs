//! Calendar month handling for the leaderboard and transfer history.
//!
//! Months are parsed from and printed as `YYYY-MM` and cover the half-open
//! UTC interval `[first day 00:00, first day of next month 00:00)`.

use crate::errors::Rejection;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use std::{fmt, str::FromStr};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// Returns `None` for an invalid month number or out-of-range year.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The month a date falls in.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current UTC month.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// Parses an optional `YYYY-MM` query value, defaulting to the current month.
    pub fn parse_or_current(input: Option<&str>) -> Result<Self, Rejection> {
        match input.map(str::trim) {
            Some(value) if !value.is_empty() => value.parse(),
            _ => Ok(Self::current()),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Inclusive start of the month.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive end of the month.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map_or(DateTime::<Utc>::MAX_UTC, |next| {
                next.and_time(NaiveTime::MIN).and_utc()
            })
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end()
    }

    /// This month and the `count - 1` months before it, newest first.
    #[must_use]
    pub fn recent(self, count: usize) -> Vec<Self> {
        std::iter::successors(Some(self), |month| {
            month
                .first_day
                .checked_sub_months(Months::new(1))
                .map(|first_day| Self { first_day })
        })
        .take(count)
        .collect()
    }
}

impl FromStr for Month {
    type Err = Rejection;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || Rejection::InvalidMonth {
            input: input.to_string(),
        };

        let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if month.is_empty() || month.len() > 2 || !month.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_and_display() {
        let month: Month = "2026-03".parse().unwrap();
        assert_eq!(month.year(), 2026);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2026-03");

        // single digit months are accepted
        assert_eq!("2026-3".parse::<Month>().unwrap(), month);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "2026", "2026-13", "2026-00", "26-01", "abcd-01", "2026-1a", "2026-001"] {
            assert_eq!(
                input.parse::<Month>(),
                Err(Rejection::InvalidMonth {
                    input: input.to_string()
                }),
                "{input}"
            );
        }
    }

    #[test]
    fn test_bounds() {
        let december = Month::new(2025, 12).unwrap();
        assert_eq!(
            december.start(),
            Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            december.end(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(december.contains(Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap()));
        assert!(!december.contains(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_containing_and_default() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(Month::containing(date), Month::new(2026, 10).unwrap());
        assert_eq!(Month::parse_or_current(None).unwrap(), Month::current());
        assert_eq!(Month::parse_or_current(Some("  ")).unwrap(), Month::current());
        assert!(Month::parse_or_current(Some("nope")).is_err());
    }

    #[test]
    fn test_recent_months() {
        let months = Month::new(2026, 2).unwrap().recent(3);
        let labels: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["2026-02", "2026-01", "2025-12"]);
    }
}
