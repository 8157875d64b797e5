//! Settings service
//!
//! Reads the singleton settings record (falling back to defaults) and keeps
//! the "last used" entry values up to date.

use crate::config::settings::{LastUsed, Settings};
use crate::error::StorageError;
use crate::storage::{StorageAdapter, StorageKey};

/// Service for the settings record
#[derive(Clone, Copy)]
pub struct SettingsService<'a> {
    storage: &'a StorageAdapter,
}

impl<'a> SettingsService<'a> {
    /// Create a new settings service
    pub fn new(storage: &'a StorageAdapter) -> Self {
        Self { storage }
    }

    /// The persisted settings, or the defaults if none were saved yet
    pub fn get_settings(&self) -> Result<Settings, StorageError> {
        Ok(self
            .storage
            .get::<Settings>(StorageKey::Settings)?
            .unwrap_or_default())
    }

    /// Overwrite the three last-used values and write the full record back
    pub fn update_last_used(&self, values: LastUsed) -> Result<(), StorageError> {
        let mut settings = self.get_settings()?;
        settings.apply_last_used(values);
        self.storage.set(StorageKey::Settings, &settings)?;
        tracing::debug!(
            category = settings.last_used_category.code(),
            subcategory = %settings.last_used_subcategory,
            "last-used values updated"
        );
        Ok(())
    }

    /// The last-used values, defaulted if no settings exist
    pub fn get_last_used(&self) -> Result<LastUsed, StorageError> {
        Ok(self.get_settings()?.last_used())
    }
}
