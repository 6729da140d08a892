//! Date ranges for sales listings.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult};

/// Which slice of the ledger to read, relative to "today".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesWindow {
    /// From `today - n days` onward.
    LastDays(u32),
    /// Today's calendar month.
    CurrentMonth,
    /// From `today - n months` onward (day clamped to the month's end).
    LastMonths(u32),
    /// Strictly before the given date.
    Before(NaiveDate),
}

/// Half-open date range `[from, until)`; `None` means unbounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.until.is_none_or(|u| date < u)
    }
}

impl SalesWindow {
    pub fn range(&self, today: NaiveDate) -> DomainResult<DateRange> {
        let out_of_range = || DomainError::validation("sales window is out of the supported date range");
        match *self {
            SalesWindow::LastDays(n) => Ok(DateRange {
                from: Some(today.checked_sub_signed(Duration::days(i64::from(n))).ok_or_else(out_of_range)?),
                until: None,
            }),
            SalesWindow::CurrentMonth => {
                let first = today.with_day(1).ok_or_else(out_of_range)?;
                let next = first.checked_add_months(Months::new(1)).ok_or_else(out_of_range)?;
                Ok(DateRange {
                    from: Some(first),
                    until: Some(next),
                })
            }
            SalesWindow::LastMonths(n) => Ok(DateRange {
                from: Some(today.checked_sub_months(Months::new(n)).ok_or_else(out_of_range)?),
                until: None,
            }),
            SalesWindow::Before(date) => Ok(DateRange {
                from: None,
                until: Some(date),
            }),
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
    fn last_week_includes_boundary_day() {
        let r = SalesWindow::LastDays(7).range(d(2026, 10, 16)).unwrap();
        assert!(r.contains(d(2026, 10, 9)));
        assert!(!r.contains(d(2026, 10, 8)));
        assert!(r.contains(d(2026, 10, 16)));
    }

    #[test]
    fn current_month_is_bounded_both_sides() {
        let r = SalesWindow::CurrentMonth.range(d(2026, 12, 31)).unwrap();
        assert_eq!(r.from, Some(d(2026, 12, 1)));
        assert_eq!(r.until, Some(d(2027, 1, 1)));
        assert!(!r.contains(d(2025, 12, 15)));
    }

    #[test]
    fn last_months_clamps_to_month_end() {
        let r = SalesWindow::LastMonths(1).range(d(2026, 3, 31)).unwrap();
        assert_eq!(r.from, Some(d(2026, 2, 28)));
        let r = SalesWindow::LastMonths(0).range(d(2026, 3, 31)).unwrap();
        assert_eq!(r.from, Some(d(2026, 3, 31)));
    }

    #[test]
    fn before_excludes_the_date() {
        let r = SalesWindow::Before(d(2026, 10, 16)).range(d(2026, 10, 16)).unwrap();
        assert!(r.contains(d(2026, 10, 15)));
        assert!(!r.contains(d(2026, 10, 16)));
    }
}
