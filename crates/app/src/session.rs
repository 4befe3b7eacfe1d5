//! Wiring of the state store over the file-backed key-value store.

use std::sync::Arc;

use openheaders_application::{HistoryManager, StateStore};
use openheaders_domain::Profile;
use openheaders_infrastructure::{
    FileKeyValueStore, QueuedStateWriter, RuntimeConfig, StateRepository, SystemClock,
};
use tokio::task::JoinHandle;

pub type Store = StateStore<QueuedStateWriter, SystemClock>;

/// A loaded state store plus the task flushing its writes.
pub struct Session {
    pub store: Store,
    writer: JoinHandle<()>,
}

impl Session {
    pub async fn open(config: &RuntimeConfig) -> Self {
        let kv = Arc::new(FileKeyValueStore::new(&config.state_dir));
        let repository = StateRepository::new(kv);
        let loaded = repository.load().await;
        let (writer, task) = QueuedStateWriter::spawn(repository);
        let store = StateStore::with_history(
            loaded,
            writer,
            SystemClock::new(),
            HistoryManager::with_capacity(config.history_limit),
        );
        Self {
            store,
            writer: task,
        }
    }

    /// Drops the store and waits until every queued write has landed.
    pub async fn close(self) {
        drop(self.store);
        if let Err(error) = self.writer.await {
            tracing::warn!(%error, "state writer task failed");
        }
    }

    /// Resolves a profile by id, then by exact name.
    pub fn find_profile(&self, key: &str) -> Option<&Profile> {
        let profiles = &self.store.state().profiles;
        profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| profiles.iter().find(|p| p.name == key))
    }

    /// Resolves an optional profile reference, defaulting to the active one.
    pub fn resolve_profile_id(&self, key: Option<&str>) -> Option<String> {
        match key {
            Some(key) => self.find_profile(key),
            None => self.store.active_profile(),
        }
        .map(|p| p.id.clone())
    }
}
