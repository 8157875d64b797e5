//! Export and restore for spendlog
//!
//! - CSV: expenses in a period, spreadsheet-compatible
//! - JSON: full backup, also the restore format
//! - YAML: full backup in human-readable form

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_csv, CSV_HEADER};
pub use json::{
    delete_all, export_json, import_json, parse_backup, validate_backup, write_json, BackupData,
};
pub use yaml::{export_yaml, parse_backup_yaml};
