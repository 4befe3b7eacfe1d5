//! Storage ports

use async_trait::async_trait;
use openheaders_domain::AppState;
use tokio::sync::broadcast;

use crate::ApplicationResult;

/// Key under which the application state document is stored.
pub const STATE_KEY: &str = "openheaders_state";

/// Notification emitted when a key is written.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    /// Key that changed.
    pub key: String,
    /// New value.
    pub value: serde_json::Value,
}

/// Port for the extension's key-value storage area.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &str) -> ApplicationResult<Option<serde_json::Value>>;

    /// Writes a key and notifies subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    async fn set(&self, key: &str, value: serde_json::Value) -> ApplicationResult<()>;

    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Port the state store hands every committed state to.
///
/// Calls are synchronous and must not block on I/O; implementations queue
/// the write and report failures through logging.
pub trait StatePersister: Send + Sync {
    /// Schedules `state` to be written.
    fn persist(&self, state: &AppState);
}
