//! Aggregation period representation
//!
//! Every report runs over an inclusive `[start_date, end_date]` range.
//! Monthly ranges and Monday-start weeks are derived here.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive date range used by reports and CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AggregationPeriod {
    /// Create a custom period
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// The calendar month `year-month`, or `None` for an invalid month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, next_month - Duration::days(1)))
    }

    /// The month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .map(|d| d - Duration::days(1))
            .unwrap_or(date);
        Self::new(start, end)
    }

    /// The current calendar month in local time
    pub fn current_month() -> Self {
        Self::month_of(chrono::Local::now().date_naive())
    }

    /// Parse a month written as `YYYY-MM`
    pub fn parse_month(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::month(year.parse().ok()?, month.parse().ok()?)
    }

    /// The Monday-start week containing `date`
    pub fn week_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        Self::new(start, start + Duration::days(6))
    }

    /// The week immediately before this one
    pub fn previous_week(&self) -> Self {
        Self::new(
            self.start_date - Duration::days(7),
            self.start_date - Duration::days(1),
        )
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl fmt::Display for AggregationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}
