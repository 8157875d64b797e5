//! Core data models for spendlog
//!
//! Expenses, templates, the category table and aggregation periods.

pub mod category;
pub mod expense;
pub mod ids;
pub mod period;
pub mod template;

pub use category::{subcategory_label, Category, Subcategory};
pub use expense::{
    parse_iso_date, Expense, ExpenseFilter, ExpenseInput, ExpenseUpdate, ExpenseValidationError,
    FrequentAmount, MAX_AMOUNT, MAX_MEMO_LENGTH, MIN_AMOUNT,
};
pub use ids::{ExpenseId, TemplateId};
pub use period::AggregationPeriod;
pub use template::{Template, TemplateInput, TemplateUpdate, TemplateValidationError};
