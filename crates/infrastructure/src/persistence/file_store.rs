//! Directory-backed key-value store.
//!
//! Each key lives in its own `<key>.json` file. Writes go to a temporary file
//! first and are renamed into place, so a crash never leaves a torn document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use openheaders_application::{ApplicationResult, KeyValueStore, StorageChange};
use serde_json::Value;
use tokio::fs;
use tokio::sync::broadcast;

use super::{CHANGE_CAPACITY, StorageError};
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Store keeping one JSON file per key under a directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    changes: broadcast::Sender<StorageChange>,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            dir: dir.into(),
            changes,
        }
    }

    /// Returns the store's directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for keys that are empty or contain
    /// anything besides ASCII alphanumerics, `-` and `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key)?;
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(from_json_bytes(&content)?))
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, to_json_stable_bytes(value)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> ApplicationResult<Option<Value>> {
        Ok(self.read(key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> ApplicationResult<()> {
        self.write(key, &value).await?;
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
