//! Storage layer for spendlog
//!
//! `StorageAdapter` is the only component that touches persistent state. It
//! serializes values to JSON text and hands them to a `KeyValueBackend`,
//! translating backend failures into `StorageError`. Swapping the backend
//! (files, memory, something transactional later) does not affect callers.

pub mod backend;
pub mod file_io;

pub use backend::{BackendError, KeyValueBackend, MemoryBackend};
pub use file_io::FileBackend;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::config::paths::SpendPaths;
use crate::error::{SpendResult, StorageError};

/// The three records spendlog persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Expenses,
    Templates,
    Settings,
}

impl StorageKey {
    /// Stable key name in the backing store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expenses => "expenses",
            Self::Templates => "templates",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON-serializing front for a key/value backing store
pub struct StorageAdapter {
    backend: Box<dyn KeyValueBackend>,
}

impl StorageAdapter {
    /// Wrap an arbitrary backend
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Open the file-backed store under the data directory
    pub fn open(paths: &SpendPaths) -> SpendResult<Self> {
        paths.ensure_directories()?;
        Ok(Self::new(FileBackend::new(paths.data_dir())))
    }

    /// A fresh store that lives only as long as this adapter
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Read and decode the value under `key`
    ///
    /// Absent keys succeed with `None`. Text that does not decode as `T` is a
    /// parse error.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        let raw = self.backend.read(key.as_str()).map_err(|e| {
            StorageError::Unknown(format!("Failed to get value for key \"{}\": {}", key, e))
        })?;

        let Some(raw) = raw else {
            tracing::trace!(%key, "storage miss");
            return Ok(None);
        };

        tracing::trace!(%key, bytes = raw.len(), "storage read");
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            StorageError::Parse(format!("Failed to parse JSON for key \"{}\": {}", key, e))
        })
    }

    /// Encode `value` and write it under `key`
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            StorageError::Unknown(format!("Failed to serialize value for key \"{}\": {}", key, e))
        })?;

        self.backend
            .write(key.as_str(), &serialized)
            .map_err(|e| match e {
                BackendError::QuotaExceeded(detail) => StorageError::QuotaExceeded(format!(
                    "Storage quota exceeded for key \"{}\": {}",
                    key, detail
                )),
                BackendError::Failed(detail) => StorageError::Unknown(format!(
                    "Failed to set value for key \"{}\": {}",
                    key, detail
                )),
            })?;

        tracing::trace!(%key, bytes = serialized.len(), "storage write");
        Ok(())
    }

    /// Remove the value under `key`
    pub fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.backend.delete(key.as_str()).map_err(|e| {
            StorageError::Unknown(format!("Failed to remove key \"{}\": {}", key, e))
        })?;
        tracing::trace!(%key, "storage remove");
        Ok(())
    }

    /// Remove every stored value
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend
            .clear()
            .map_err(|e| StorageError::Unknown(format!("Failed to clear storage: {}", e)))?;
        tracing::debug!("storage cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    /// Backend whose every operation fails
    struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, BackendError> {
            Err(BackendError::Failed("device unavailable".into()))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Err(BackendError::Failed("device unavailable".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), BackendError> {
            Err(BackendError::Failed("device unavailable".into()))
        }
        fn clear(&self) -> Result<(), BackendError> {
            Err(BackendError::Failed("device unavailable".into()))
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::Expenses.as_str(), "expenses");
        assert_eq!(StorageKey::Templates.as_str(), "templates");
        assert_eq!(StorageKey::Settings.as_str(), "settings");
    }

    #[test]
    fn test_get_absent_is_none() {
        let adapter = StorageAdapter::in_memory();
        let value: Option<TestData> = adapter.get(StorageKey::Settings).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_set_and_get() {
        let adapter = StorageAdapter::in_memory();
        let data = TestData {
            name: "test".into(),
            value: 42,
        };
        adapter.set(StorageKey::Settings, &data).unwrap();
        let loaded: Option<TestData> = adapter.get(StorageKey::Settings).unwrap();
        assert_eq!(loaded, Some(data));
    }

    #[test]
    fn test_get_malformed_is_parse_error() {
        let adapter = StorageAdapter::in_memory();
        adapter.backend.write("expenses", "{not json").unwrap();
        let err = adapter.get::<Vec<TestData>>(StorageKey::Expenses).unwrap_err();
        assert!(matches!(err, StorageError::Parse(_)));
    }

    #[test]
    fn test_get_wrong_shape_is_parse_error() {
        let adapter = StorageAdapter::in_memory();
        adapter.backend.write("expenses", "{\"a\": 1}").unwrap();
        let err = adapter.get::<Vec<TestData>>(StorageKey::Expenses).unwrap_err();
        assert!(matches!(err, StorageError::Parse(_)));
    }

    #[test]
    fn test_quota_exceeded() {
        let adapter = StorageAdapter::new(MemoryBackend::with_capacity(16));
        let big = vec![1u32; 100];
        let err = adapter.set(StorageKey::Expenses, &big).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded(_)));
    }

    #[test]
    fn test_backend_failures_are_unknown() {
        let adapter = StorageAdapter::new(BrokenBackend);
        assert!(matches!(
            adapter.get::<TestData>(StorageKey::Settings),
            Err(StorageError::Unknown(_))
        ));
        assert!(matches!(
            adapter.set(StorageKey::Settings, &1),
            Err(StorageError::Unknown(_))
        ));
        assert!(matches!(
            adapter.remove(StorageKey::Settings),
            Err(StorageError::Unknown(_))
        ));
        assert!(matches!(adapter.clear(), Err(StorageError::Unknown(_))));
    }

    #[test]
    fn test_remove_and_clear() {
        let adapter = StorageAdapter::in_memory();
        adapter.set(StorageKey::Expenses, &vec![1]).unwrap();
        adapter.set(StorageKey::Templates, &vec![2]).unwrap();

        adapter.remove(StorageKey::Expenses).unwrap();
        assert_eq!(adapter.get::<Vec<i32>>(StorageKey::Expenses).unwrap(), None);

        adapter.clear().unwrap();
        assert_eq!(adapter.get::<Vec<i32>>(StorageKey::Templates).unwrap(), None);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let adapter = StorageAdapter::open(&paths).unwrap();

        adapter.set(StorageKey::Templates, &vec!["a", "b"]).unwrap();
        assert!(paths.data_dir().join("templates.json").exists());

        let reopened = StorageAdapter::open(&paths).unwrap();
        let loaded: Option<Vec<String>> = reopened.get(StorageKey::Templates).unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
