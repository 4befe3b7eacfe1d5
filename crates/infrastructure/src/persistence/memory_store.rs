//! In-memory key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use openheaders_application::{ApplicationResult, KeyValueStore, StorageChange};
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use super::CHANGE_CAPACITY;

/// Volatile store, used for tests and for dry runs of the CLI.
#[derive(Debug)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Creates a store pre-populated with `values`, without notifications.
    #[must_use]
    pub fn with_values(values: impl IntoIterator<Item = (String, Value)>) -> Self {
        let store = Self::new();
        Self {
            values: RwLock::new(values.into_iter().collect()),
            ..store
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> ApplicationResult<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> ApplicationResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.clone());
        // No subscribers is fine.
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
