//! Backing stores for the storage adapter
//!
//! A backing store maps string keys to raw string values and knows nothing
//! about JSON. The file-based store lives in `file_io`; the in-memory store
//! here is used by tests and for throwaway sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

/// Failures a backing store can signal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The store has no room left for the write
    #[error("{0}")]
    QuotaExceeded(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Raw key/value persistence
pub trait KeyValueBackend {
    /// Read the raw value for `key`, `None` if absent
    fn read(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Replace the value for `key`
    fn write(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Remove every key
    fn clear(&self) -> Result<(), BackendError>;
}

/// In-memory backing store with an optional byte capacity
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryBackend {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that holds at most `bytes` of keys plus values
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(bytes),
        }
    }

    /// Total bytes currently stored
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| BackendError::Failed(format!("Failed to acquire read lock: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| BackendError::Failed(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(capacity) = self.capacity {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > capacity {
                return Err(BackendError::QuotaExceeded(format!(
                    "writing '{}' needs {} bytes, capacity is {}",
                    key, needed, capacity
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| BackendError::Failed(format!("Failed to acquire write lock: {}", e)))?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| BackendError::Failed(format!("Failed to acquire write lock: {}", e)))?;
        entries.clear();
        Ok(())
    }
}
