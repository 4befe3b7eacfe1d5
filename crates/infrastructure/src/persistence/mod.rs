//! Persistence adapters
//!
//! Key-value stores backing the storage port, loading of the persisted
//! application state (with migration of legacy shapes), and the queued
//! writer the state store persists through.

mod file_store;
mod memory_store;
mod migration;
mod state_repository;
mod state_writer;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use migration::{MigrationError, migrate_state};
pub use state_repository::StateRepository;
pub use state_writer::QueuedStateWriter;

use openheaders_application::ApplicationError;

use crate::serialization::SerializationError;

/// Capacity of the change-notification channel of each store.
pub(crate) const CHANGE_CAPACITY: usize = 64;

/// Error type for key-value store backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Key cannot be mapped to a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Serialization(e) => Self::Serialization(e.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}
