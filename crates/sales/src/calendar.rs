//! Calendar features recorded with each day's sales.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult};

/// Derived calendar fields of a sales day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    /// Monday = 1 .. Sunday = 7.
    pub day: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

/// Set of dates treated as public holidays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of `YYYY-MM-DD` dates. Blank entries are ignored.
    pub fn parse_list(raw: &str) -> DomainResult<Self> {
        let mut dates = BTreeSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let date = NaiveDate::parse_from_str(part, "%Y-%m-%d")
                .map_err(|e| DomainError::validation(format!("invalid holiday '{part}': {e}")))?;
            dates.insert(date);
        }
        Ok(Self { dates })
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn fields_for(&self, date: NaiveDate) -> CalendarFields {
        let day = date.weekday().number_from_monday();
        CalendarFields {
            day,
            month: date.month(),
            is_weekend: day >= 6,
            is_holiday: self.is_holiday(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_numbering_starts_monday() {
        let cal = HolidayCalendar::default();
        // 2026-10-12 is a Monday.
        assert_eq!(cal.fields_for(d(2026, 10, 12)).day, 1);
        assert!(!cal.fields_for(d(2026, 10, 16)).is_weekend);
        let sat = cal.fields_for(d(2026, 10, 17));
        assert_eq!((sat.day, sat.is_weekend), (6, true));
        let sun = cal.fields_for(d(2026, 10, 18));
        assert_eq!((sun.day, sun.month, sun.is_weekend), (7, 10, true));
    }

    #[test]
    fn holidays_come_from_the_list() {
        let cal = HolidayCalendar::parse_list("2026-12-25, ,2026-01-01").unwrap();
        assert_eq!(cal.len(), 2);
        assert!(cal.fields_for(d(2026, 12, 25)).is_holiday);
        assert!(!cal.fields_for(d(2026, 12, 24)).is_holiday);
        assert!(HolidayCalendar::parse_list("25/12/2026").is_err());
    }
}
