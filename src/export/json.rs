//! JSON backup and restore
//!
//! A backup is a snapshot of every persisted record. Restoring replaces the
//! whole store after the backup passes structural and schema checks.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::settings::Settings;
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, Template};
use crate::services::SettingsService;
use crate::storage::{StorageAdapter, StorageKey};

/// Full snapshot of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    /// Schema version of the data inside
    pub schema_version: u32,

    /// When the snapshot was taken, RFC 3339
    pub exported_at: String,

    pub expenses: Vec<Expense>,

    pub templates: Vec<Template>,

    pub settings: Settings,
}

impl BackupData {
    /// Snapshot the current store
    ///
    /// Absent collections export as empty and absent settings as defaults.
    pub fn from_storage(storage: &StorageAdapter) -> SpendResult<Self> {
        let expenses = storage
            .get::<Vec<Expense>>(StorageKey::Expenses)?
            .unwrap_or_default();
        let templates = storage
            .get::<Vec<Template>>(StorageKey::Templates)?
            .unwrap_or_default();
        let settings = SettingsService::new(storage).get_settings()?;

        Ok(Self {
            schema_version: settings.schema_version,
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            expenses,
            templates,
            settings,
        })
    }
}

/// Snapshot the whole store
pub fn export_json(storage: &StorageAdapter) -> SpendResult<BackupData> {
    BackupData::from_storage(storage)
}

/// Snapshot the whole store and write it as JSON
pub fn write_json<W: Write>(
    storage: &StorageAdapter,
    writer: &mut W,
    pretty: bool,
) -> SpendResult<()> {
    let backup = export_json(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &backup)
    } else {
        serde_json::to_writer(writer, &backup)
    }
    .map_err(|e| SpendError::Export(e.to_string()))?;

    tracing::debug!(
        expenses = backup.expenses.len(),
        templates = backup.templates.len(),
        "json export"
    );
    Ok(())
}

fn invalid(message: &str) -> SpendError {
    SpendError::InvalidFormat(message.to_string())
}

/// Check that `data` is a restorable backup and decode it
///
/// Structural checks run in field order, then the schema version is compared
/// with the one in the stored settings (or the default when none are
/// readable), then every record is decoded.
pub fn validate_backup(storage: &StorageAdapter, data: &Value) -> SpendResult<BackupData> {
    let object = data
        .as_object()
        .ok_or_else(|| invalid("backup must be a JSON object"))?;

    let actual = object
        .get("schemaVersion")
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid("schemaVersion must be a number"))?;

    if !object.get("exportedAt").map_or(false, Value::is_string) {
        return Err(invalid("exportedAt must be a string"));
    }
    if !object.get("expenses").map_or(false, Value::is_array) {
        return Err(invalid("expenses must be an array"));
    }
    if !object.get("templates").map_or(false, Value::is_array) {
        return Err(invalid("templates must be an array"));
    }
    if !object.get("settings").map_or(false, Value::is_object) {
        return Err(invalid("settings must be an object"));
    }

    let expected = match SettingsService::new(storage).get_settings() {
        Ok(settings) => settings.schema_version,
        Err(e) => {
            tracing::warn!(error = %e, "stored settings unreadable, using default schema version");
            Settings::default().schema_version
        }
    };

    if actual != expected as f64 {
        return Err(SpendError::SchemaMismatch { expected, actual });
    }

    // `1.0` matches version 1 but would not decode as an integer
    let mut normalized = data.clone();
    normalized["schemaVersion"] = Value::from(expected);

    serde_json::from_value(normalized)
        .map_err(|e| SpendError::InvalidFormat(format!("backup records are malformed: {}", e)))
}

/// Parse JSON backup text and validate it
pub fn parse_backup(storage: &StorageAdapter, text: &str) -> SpendResult<BackupData> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SpendError::InvalidFormat(format!("backup is not valid JSON: {}", e)))?;
    validate_backup(storage, &value)
}

/// Replace the whole store with a validated backup
///
/// The store is cleared first and the three records are written one after
/// another; a failure part way leaves whatever was written so far.
pub fn import_json(storage: &StorageAdapter, backup: &BackupData) -> SpendResult<()> {
    storage.clear()?;
    storage.set(StorageKey::Expenses, &backup.expenses)?;
    storage.set(StorageKey::Templates, &backup.templates)?;
    storage.set(StorageKey::Settings, &backup.settings)?;

    tracing::debug!(
        expenses = backup.expenses.len(),
        templates = backup.templates.len(),
        "backup restored"
    );
    Ok(())
}

/// Remove every persisted record
pub fn delete_all(storage: &StorageAdapter) -> SpendResult<()> {
    storage.clear()?;
    Ok(())
}
