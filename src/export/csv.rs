//! CSV export
//!
//! One row per expense in the period, newest first, under a fixed header.

use crate::error::{SpendError, SpendResult};
use crate::models::{AggregationPeriod, ExpenseFilter};
use crate::services::ExpenseService;
use crate::storage::StorageAdapter;

/// Column header, in output order
pub const CSV_HEADER: [&str; 6] = [
    "date",
    "amount",
    "category",
    "subcategory",
    "memo",
    "satisfaction",
];

/// Export the expenses dated within `period` as CSV text
///
/// Lines end in `\n`. Fields are quoted only when they contain a comma, a
/// double quote or a line break, with inner quotes doubled. A missing memo
/// or satisfaction is written as an empty field.
pub fn export_csv(storage: &StorageAdapter, period: AggregationPeriod) -> SpendResult<String> {
    let expenses = ExpenseService::new(storage)
        .list(&ExpenseFilter::between(period.start_date, period.end_date))?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| SpendError::Export(e.to_string()))?;

    for expense in &expenses {
        writer
            .write_record([
                expense.date.format("%Y-%m-%d").to_string(),
                expense.amount.to_string(),
                expense.category.code().to_string(),
                expense.subcategory.clone(),
                expense.memo.clone().unwrap_or_default(),
                expense
                    .satisfaction
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            ])
            .map_err(|e| SpendError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SpendError::Export(e.to_string()))?;

    tracing::debug!(rows = expenses.len(), %period, "csv export");
    String::from_utf8(bytes).map_err(|e| SpendError::Export(e.to_string()))
}
