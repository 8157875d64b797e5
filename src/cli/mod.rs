//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the clap
//! argument parsing with the service layer. Handlers print their results and
//! return `SpendResult`; the binary turns errors into a non-zero exit.

pub mod data;
pub mod expense;
pub mod report;
pub mod template;

pub use data::{handle_export_command, handle_import, handle_reset, ExportCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use report::{handle_report_command, ReportCommands};
pub use template::{handle_template_command, TemplateCommands};

use clap::Args;
use uuid::Uuid;

use crate::error::{SpendError, SpendResult};
use crate::models::{parse_iso_date, AggregationPeriod};

/// Date range selection shared by reports, listing and CSV export
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Month to cover (YYYY-MM); defaults to the current month
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl PeriodArgs {
    /// Resolve to a concrete period, defaulting to the current month
    ///
    /// With only one of `--from`/`--to`, the other end comes from the month
    /// containing the given date.
    pub fn resolve(&self) -> SpendResult<AggregationPeriod> {
        if let Some(month) = &self.month {
            return AggregationPeriod::parse_month(month).ok_or_else(|| {
                SpendError::validation("month", format!("expected YYYY-MM, got '{}'", month))
            });
        }

        let from = self.from.as_deref().map(|d| parse_date("from", d)).transpose()?;
        let to = self.to.as_deref().map(|d| parse_date("to", d)).transpose()?;

        let period = match (from, to) {
            (Some(start), Some(end)) => AggregationPeriod::new(start, end),
            (Some(start), None) => {
                AggregationPeriod::new(start, AggregationPeriod::month_of(start).end_date)
            }
            (None, Some(end)) => {
                AggregationPeriod::new(AggregationPeriod::month_of(end).start_date, end)
            }
            (None, None) => AggregationPeriod::current_month(),
        };

        if period.start_date > period.end_date {
            return Err(SpendError::validation(
                "from",
                format!("{} is after {}", period.start_date, period.end_date),
            ));
        }
        Ok(period)
    }
}

/// Parse a `YYYY-MM-DD` command-line date
pub(crate) fn parse_date(field: &'static str, value: &str) -> SpendResult<chrono::NaiveDate> {
    parse_iso_date(value.trim()).ok_or_else(|| {
        SpendError::validation(field, format!("expected YYYY-MM-DD, got '{}'", value))
    })
}

/// Resolve an ID given as a full UUID or a unique prefix of one
///
/// `ids` are the candidates to match a prefix against; `not_found` builds the
/// error for an unmatched reference.
pub(crate) fn resolve_id<T, F>(reference: &str, ids: &[T], not_found: F) -> SpendResult<T>
where
    T: Copy + std::fmt::Display + From<Uuid>,
    F: Fn(String) -> SpendError,
{
    let reference = reference.trim();
    if let Ok(uuid) = Uuid::parse_str(reference) {
        return Ok(T::from(uuid));
    }

    let needle = reference.to_lowercase();
    if needle.is_empty() {
        return Err(not_found(reference.to_string()));
    }

    let mut matches = ids.iter().filter(|id| id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(*id),
        (Some(_), Some(_)) => Err(SpendError::validation(
            "id",
            format!("'{}' matches more than one record", reference),
        )),
        _ => Err(not_found(reference.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseId;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_from_month() {
        let args = PeriodArgs {
            month: Some("2024-02".into()),
            ..Default::default()
        };
        let period = args.resolve().unwrap();
        assert_eq!(period.start_date, date(2024, 2, 1));
        assert_eq!(period.end_date, date(2024, 2, 29));
    }

    #[test]
    fn test_period_from_range() {
        let args = PeriodArgs {
            from: Some("2025-01-10".into()),
            to: Some("2025-03-05".into()),
            ..Default::default()
        };
        let period = args.resolve().unwrap();
        assert_eq!(period, AggregationPeriod::new(date(2025, 1, 10), date(2025, 3, 5)));
    }

    #[test]
    fn test_period_open_ended() {
        let args = PeriodArgs {
            from: Some("2025-01-10".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve().unwrap().end_date, date(2025, 1, 31));
    }

    #[test]
    fn test_period_errors() {
        let bad_month = PeriodArgs {
            month: Some("2025-13".into()),
            ..Default::default()
        };
        assert_eq!(bad_month.resolve().unwrap_err().field(), Some("month"));

        let reversed = PeriodArgs {
            from: Some("2025-02-01".into()),
            to: Some("2025-01-01".into()),
            ..Default::default()
        };
        assert_eq!(reversed.resolve().unwrap_err().field(), Some("from"));

        let bad_date = PeriodArgs {
            to: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(bad_date.resolve().unwrap_err().field(), Some("to"));
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let a = ExpenseId::new();
        let b = ExpenseId::new();
        let ids = [a, b];

        assert_eq!(
            resolve_id(&a.to_string(), &ids, SpendError::expense_not_found).unwrap(),
            a
        );
        assert_eq!(
            resolve_id(&b.to_string()[..8], &ids, SpendError::expense_not_found).unwrap(),
            b
        );
        assert!(resolve_id("zzzz", &ids, SpendError::expense_not_found)
            .unwrap_err()
            .is_not_found());
        assert!(resolve_id("", &ids, SpendError::expense_not_found)
            .unwrap_err()
            .is_not_found());
    }
}
