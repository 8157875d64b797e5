//! Expense model
//!
//! An expense is a single dated payment in one category/subcategory, with an
//! optional memo and an optional 1-5 satisfaction rating.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::ids::ExpenseId;

/// Smallest amount an expense may record
pub const MIN_AMOUNT: i64 = 1;

/// Largest amount an expense may record
///
/// Keeps period totals far from `i64` overflow.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum memo length in characters
pub const MAX_MEMO_LENGTH: usize = 200;

/// Inclusive satisfaction range
pub const SATISFACTION_MIN: u8 = 1;
pub const SATISFACTION_MAX: u8 = 5;

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Day the money was spent
    pub date: NaiveDate,

    /// Amount in whole currency units
    pub amount: i64,

    /// Top-level category
    pub category: Category,

    /// Subcategory code within `category`
    pub subcategory: String,

    /// Free-form note
    #[serde(default)]
    pub memo: Option<String>,

    /// How worthwhile the spend felt, 1-5
    #[serde(default)]
    pub satisfaction: Option<u8>,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an expense
///
/// The date is kept as text so the exact `YYYY-MM-DD` shape can be checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    pub date: String,
    pub amount: i64,
    pub category: Category,
    pub subcategory: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub satisfaction: Option<u8>,
}

/// Partial update for an expense
///
/// `memo` and `satisfaction` are doubly optional: `Some(None)` clears the
/// value, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub date: Option<String>,
    pub amount: Option<i64>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub memo: Option<Option<String>>,
    pub satisfaction: Option<Option<u8>>,
}

impl ExpenseUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.memo.is_none()
            && self.satisfaction.is_none()
    }
}

/// Filter for listing expenses; every constraint is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    /// Filter to an inclusive date range
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    /// Whether an expense passes every constraint
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }
        if let Some(subcategory) = &self.subcategory {
            if &expense.subcategory != subcategory {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if expense.date > end {
                return false;
            }
        }
        true
    }
}

/// An amount that recurs among recent expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequentAmount {
    pub amount: i64,
    pub count: usize,
}

/// Validation errors for expenses, in the order they are checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    InvalidDate(String),
    AmountTooSmall(i64),
    AmountTooLarge(i64),
    SatisfactionOutOfRange(u8),
    MemoTooLong(usize),
    UnknownSubcategory {
        category: Category,
        subcategory: String,
    },
}

impl ExpenseValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "date",
            Self::AmountTooSmall(_) | Self::AmountTooLarge(_) => "amount",
            Self::SatisfactionOutOfRange(_) => "satisfaction",
            Self::MemoTooLong(_) => "memo",
            Self::UnknownSubcategory { .. } => "subcategory",
        }
    }
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate(value) => {
                write!(f, "date must be a YYYY-MM-DD calendar date, got '{}'", value)
            }
            Self::AmountTooSmall(amount) => {
                write!(f, "amount must be at least {}, got {}", MIN_AMOUNT, amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "amount must be at most {}, got {}", MAX_AMOUNT, amount)
            }
            Self::SatisfactionOutOfRange(value) => write!(
                f,
                "satisfaction must be between {} and {}, got {}",
                SATISFACTION_MIN, SATISFACTION_MAX, value
            ),
            Self::MemoTooLong(len) => write!(
                f,
                "memo too long ({} chars, max {})",
                len, MAX_MEMO_LENGTH
            ),
            Self::UnknownSubcategory {
                category,
                subcategory,
            } => write!(
                f,
                "'{}' is not a {} subcategory",
                subcategory,
                category.code()
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

/// Parse a date that must be written exactly as `YYYY-MM-DD`
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Check the fields shared by create and update, in precedence order
pub(crate) fn validate_fields(
    date: &str,
    amount: i64,
    satisfaction: Option<u8>,
    memo: Option<&str>,
    category: Category,
    subcategory: &str,
) -> Result<NaiveDate, ExpenseValidationError> {
    let parsed = parse_iso_date(date)
        .ok_or_else(|| ExpenseValidationError::InvalidDate(date.to_string()))?;

    if amount < MIN_AMOUNT {
        return Err(ExpenseValidationError::AmountTooSmall(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ExpenseValidationError::AmountTooLarge(amount));
    }

    if let Some(value) = satisfaction {
        if !(SATISFACTION_MIN..=SATISFACTION_MAX).contains(&value) {
            return Err(ExpenseValidationError::SatisfactionOutOfRange(value));
        }
    }

    if let Some(memo) = memo {
        let len = memo.chars().count();
        if len > MAX_MEMO_LENGTH {
            return Err(ExpenseValidationError::MemoTooLong(len));
        }
    }

    if !category.allows(subcategory) {
        return Err(ExpenseValidationError::UnknownSubcategory {
            category,
            subcategory: subcategory.to_string(),
        });
    }

    Ok(parsed)
}

impl ExpenseInput {
    /// Validate the input, returning the parsed date on success
    pub fn validate(&self) -> Result<NaiveDate, ExpenseValidationError> {
        validate_fields(
            &self.date,
            self.amount,
            self.satisfaction,
            self.memo.as_deref(),
            self.category,
            &self.subcategory,
        )
    }
}

impl Expense {
    /// Build a new expense from already-validated input
    pub(crate) fn from_input(input: ExpenseInput, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            date,
            amount: input.amount,
            category: input.category,
            subcategory: input.subcategory,
            memo: input.memo,
            satisfaction: input.satisfaction,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produce the merged record for an update, validated with create's rules
    pub(crate) fn merged(&self, update: &ExpenseUpdate) -> Result<Self, ExpenseValidationError> {
        let date = update
            .date
            .clone()
            .unwrap_or_else(|| self.date.format("%Y-%m-%d").to_string());
        let amount = update.amount.unwrap_or(self.amount);
        let category = update.category.unwrap_or(self.category);
        let subcategory = update
            .subcategory
            .clone()
            .unwrap_or_else(|| self.subcategory.clone());
        let memo = update.memo.clone().unwrap_or_else(|| self.memo.clone());
        let satisfaction = update.satisfaction.unwrap_or(self.satisfaction);

        let parsed = validate_fields(
            &date,
            amount,
            satisfaction,
            memo.as_deref(),
            category,
            &subcategory,
        )?;

        Ok(Self {
            id: self.id,
            date: parsed,
            amount,
            category,
            subcategory,
            memo,
            satisfaction,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}",
            self.date, self.amount, self.category.code(), self.subcategory
        )
    }
}
