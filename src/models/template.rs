//! Template model
//!
//! A template is a reusable preset (category, subcategory, optional amount and
//! memo) for entering recurring expenses quickly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::expense::{ExpenseInput, MAX_AMOUNT, MIN_AMOUNT};
use super::ids::TemplateId;

/// A reusable expense preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: TemplateId,

    /// Display name
    pub name: String,

    /// Category the preset fills in
    pub category: Category,

    /// Subcategory code within `category`
    pub subcategory: String,

    /// Preset amount, if any
    #[serde(default)]
    pub amount: Option<i64>,

    /// Preset memo, if any
    #[serde(default)]
    pub memo_template: Option<String>,

    /// Position in the template list, zero-based
    pub sort_order: u32,

    /// When the template was created
    pub created_at: DateTime<Utc>,

    /// When the template was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateInput {
    pub name: String,
    pub category: Category,
    pub subcategory: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub memo_template: Option<String>,
}

/// Partial update for a template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub amount: Option<Option<i64>>,
    pub memo_template: Option<Option<String>>,
}

/// Validation errors for templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    EmptyName,
    AmountTooSmall(i64),
    AmountTooLarge(i64),
    UnknownSubcategory {
        category: Category,
        subcategory: String,
    },
}

impl TemplateValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::AmountTooSmall(_) | Self::AmountTooLarge(_) => "amount",
            Self::UnknownSubcategory { .. } => "subcategory",
        }
    }
}

impl fmt::Display for TemplateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Template name cannot be empty"),
            Self::AmountTooSmall(amount) => {
                write!(f, "amount must be at least {}, got {}", MIN_AMOUNT, amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "amount must be at most {}, got {}", MAX_AMOUNT, amount)
            }
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

impl std::error::Error for TemplateValidationError {}

fn validate_fields(
    name: &str,
    amount: Option<i64>,
    category: Category,
    subcategory: &str,
) -> Result<(), TemplateValidationError> {
    if name.trim().is_empty() {
        return Err(TemplateValidationError::EmptyName);
    }

    if let Some(amount) = amount {
        if amount < MIN_AMOUNT {
            return Err(TemplateValidationError::AmountTooSmall(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(TemplateValidationError::AmountTooLarge(amount));
        }
    }

    if !category.allows(subcategory) {
        return Err(TemplateValidationError::UnknownSubcategory {
            category,
            subcategory: subcategory.to_string(),
        });
    }

    Ok(())
}

impl TemplateInput {
    /// Validate the input
    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        validate_fields(&self.name, self.amount, self.category, &self.subcategory)
    }
}

impl Template {
    /// Build a new template from validated input at the given position
    pub(crate) fn from_input(input: TemplateInput, sort_order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            name: input.name,
            category: input.category,
            subcategory: input.subcategory,
            amount: input.amount,
            memo_template: input.memo_template,
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produce the merged record for an update
    pub(crate) fn merged(&self, update: &TemplateUpdate) -> Result<Self, TemplateValidationError> {
        let mut merged = self.clone();
        if let Some(name) = &update.name {
            merged.name = name.clone();
        }
        if let Some(category) = update.category {
            merged.category = category;
        }
        if let Some(subcategory) = &update.subcategory {
            merged.subcategory = subcategory.clone();
        }
        if let Some(amount) = update.amount {
            merged.amount = amount;
        }
        if let Some(memo) = &update.memo_template {
            merged.memo_template = memo.clone();
        }

        validate_fields(
            &merged.name,
            merged.amount,
            merged.category,
            &merged.subcategory,
        )?;

        merged.updated_at = Utc::now();
        Ok(merged)
    }

    /// Prefill an expense from this template
    ///
    /// A template without an amount yields an amount of 0, which the expense
    /// validator rejects until the caller supplies a real one.
    pub fn to_expense_input(&self, date: NaiveDate) -> ExpenseInput {
        ExpenseInput {
            date: date.format("%Y-%m-%d").to_string(),
            amount: self.amount.unwrap_or(0),
            category: self.category,
            subcategory: self.subcategory.clone(),
            memo: self.memo_template.clone(),
            satisfaction: None,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
