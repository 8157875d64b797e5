//! Custom error types for spendlog
//!
//! Two layers: `StorageError` is what the persistence adapter reports about
//! the backing store, `SpendError` is what every service operation returns.

use thiserror::Error;

use crate::models::{ExpenseValidationError, TemplateValidationError};

/// Failures reported by the persistence adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store has no room for the value
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A stored value could not be decoded
    #[error("Failed to parse stored data: {0}")]
    Parse(String),

    /// Any other backing-store failure
    #[error("Storage failure: {0}")]
    Unknown(String),
}

/// The main error type for spendlog operations
#[derive(Error, Debug)]
pub enum SpendError {
    /// Caller input violates a domain invariant
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Referenced entity does not exist
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Backing-store failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Backup data is structurally wrong
    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),

    /// Backup was produced by an incompatible schema version
    #[error("Backup schema mismatch: expected version {expected}, got {actual}")]
    SchemaMismatch { expected: u32, actual: f64 },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpendError {
    /// Create a validation error for a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            id: id.into(),
        }
    }

    /// Create a "not found" error for templates
    pub fn template_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Template",
            id: id.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The offending field of a validation error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpendError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<ExpenseValidationError> for SpendError {
    fn from(err: ExpenseValidationError) -> Self {
        Self::validation(err.field(), err.to_string())
    }
}

impl From<TemplateValidationError> for SpendError {
    fn from(err: TemplateValidationError) -> Self {
        Self::validation(err.field(), err.to_string())
    }
}

/// Result type alias for spendlog operations
pub type SpendResult<T> = Result<T, SpendError>;
