//! File-backed key/value store with atomic writes
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temp file that is
//! synced and renamed over the target, so a value is either the old one or
//! the new one, never a torn mix.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::backend::{BackendError, KeyValueBackend};

/// Directory of JSON files, one per key
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

/// Write `value` to `path` and sync it to disk before returning
fn write_synced(path: &Path, value: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(value.as_bytes())?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn classify(context: String, err: io::Error) -> BackendError {
    if err.kind() == io::ErrorKind::StorageFull {
        BackendError::QuotaExceeded(format!("{}: {}", context, err))
    } else {
        BackendError::Failed(format!("{}: {}", context, err))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Failed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BackendError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            classify(format!("Failed to create directory {}", self.dir.display()), e)
        })?;

        let path = self.path_for(key);
        // Temp file in the same directory so the rename stays atomic
        let temp_path = path.with_extension("json.tmp");

        if let Err(e) = write_synced(&temp_path, value) {
            let _ = fs::remove_file(&temp_path);
            return Err(classify(format!("Failed to write {}", path.display()), e));
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            classify("Failed to rename temp file".into(), e)
        })
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::Failed(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn clear(&self) -> Result<(), BackendError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(BackendError::Failed(format!(
                    "Failed to read {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| BackendError::Failed(e.to_string()))?;
            let path = entry.path();
            let is_data = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".json") || n.ends_with(".json.tmp"))
                .unwrap_or(false);
            if is_data && path.is_file() {
                fs::remove_file(&path).map_err(|e| {
                    BackendError::Failed(format!("Failed to remove {}: {}", path.display(), e))
                })?;
            }
        }

        Ok(())
    }
}
