//! Loading and saving the application state document.

use std::sync::Arc;

use openheaders_application::{ApplicationError, ApplicationResult, KeyValueStore, STATE_KEY};
use openheaders_domain::AppState;

use super::migration::migrate_state;

/// Reads and writes [`AppState`] under [`STATE_KEY`].
#[derive(Debug)]
pub struct StateRepository<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> Clone for StateRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> StateRepository<S> {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Loads the persisted state, migrating legacy shapes.
    ///
    /// Returns `None` when nothing was stored yet, and also when the stored
    /// document is unreadable or corrupted; the caller then bootstraps a
    /// fresh state.
    pub async fn load(&self) -> Option<AppState> {
        let value = match self.store.get(STATE_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "could not read persisted state; starting fresh");
                return None;
            }
        };
        match migrate_state(value) {
            Ok(state) => Some(state),
            Err(error) => {
                tracing::warn!(%error, "persisted state is corrupted; starting fresh");
                None
            }
        }
    }

    /// Writes the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded or the store rejects
    /// the write.
    pub async fn save(&self, state: &AppState) -> ApplicationResult<()> {
        let value = serde_json::to_value(state)
            .map_err(|e| ApplicationError::Serialization(e.to_string()))?;
        self.store.set(STATE_KEY, value).await
    }
}
