//! YAML export
//!
//! The same snapshot as the JSON backup, in a more readable form.

use std::io::Write;

use serde_json::Value;

use crate::error::{SpendError, SpendResult};
use crate::export::json::{validate_backup, BackupData};
use crate::storage::StorageAdapter;

/// Snapshot the whole store and write it as YAML under a comment header
pub fn export_yaml<W: Write>(storage: &StorageAdapter, writer: &mut W) -> SpendResult<()> {
    let backup = BackupData::from_storage(storage)?;

    writeln!(writer, "# spendlog backup")?;
    writeln!(writer, "# Generated: {}", backup.exported_at)?;
    writeln!(writer, "# Restore with: spendlog import <file>")?;
    writeln!(writer)?;

    serde_yaml::to_writer(writer, &backup).map_err(|e| SpendError::Export(e.to_string()))?;
    Ok(())
}

/// Parse YAML backup text and validate it like a JSON backup
pub fn parse_backup_yaml(storage: &StorageAdapter, text: &str) -> SpendResult<BackupData> {
    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| SpendError::InvalidFormat(format!("backup is not valid YAML: {}", e)))?;
    validate_backup(storage, &value)
}
