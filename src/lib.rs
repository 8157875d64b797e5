//! spendlog - transport and social expense tracker
//!
//! This library provides the core of the spendlog application: validated
//! storage of expenses and quick-entry templates, period reports with
//! behavioural insights, and CSV/JSON/YAML export with backup restore.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory resolution and the settings record
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, templates, categories, periods)
//! - `storage`: Key/value persistence over JSON files or memory
//! - `services`: Business logic layer, including aggregation
//! - `export`: CSV export, JSON/YAML backup and restore
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `spendlog` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use spendlog::models::{Category, ExpenseInput};
//! use spendlog::services::ExpenseService;
//! use spendlog::storage::StorageAdapter;
//!
//! let storage = StorageAdapter::in_memory();
//! let expense = ExpenseService::new(&storage).create(ExpenseInput {
//!     date: "2025-01-15".into(),
//!     amount: 230,
//!     category: Category::Transport,
//!     subcategory: "bus".into(),
//!     ..Default::default()
//! })?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{SpendError, SpendResult, StorageError};
