//! State store backends

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::{StateStore, StorageError};

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One JSON file per key under a state directory
#[derive(Debug, Clone)]
pub struct FileStateStore {
    state_dir: PathBuf,
}

impl FileStateStore {
    /// Open a store, creating the directory if needed
    pub fn new(state_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let state_dir = state_dir.as_ref().to_path_buf();
        fs::create_dir_all(&state_dir).map_err(|source| StorageError::Io {
            path: state_dir.clone(),
            source,
        })?;

        Ok(Self { state_dir })
    }

    /// Directory holding the state files
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.state_dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStateStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);

        // Write to temp file first, then rename (atomic)
        let temp_path = self.state_dir.join(format!("{key}.json.tmp"));
        fs::write(&temp_path, value).map_err(|source| StorageError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "State saved");
        Ok(())
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StorageError::Poisoned)?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
