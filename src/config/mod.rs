//! Configuration module for spendlog
//!
//! - Data directory resolution
//! - The persisted settings record and its fixed parameters

pub mod paths;
pub mod settings;

pub use paths::SpendPaths;
pub use settings::{LastUsed, Settings, SCHEMA_VERSION};
