//! OpenHeaders Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus import/export and
//! runtime configuration.

pub mod adapters;
pub mod config;
pub mod export;
pub mod import;
pub mod persistence;
pub mod serialization;

pub use adapters::{SessionRuleTable, SystemClock, ToolbarState};
pub use config::{ConfigError, RuntimeConfig};
pub use export::{ExportError, export_json, write_export};
pub use import::{
    ImportConfig, ImportError, ImportFormat, ImportResult, ImportWarning, ProfileImporter,
    WarningSeverity,
};
pub use persistence::{
    FileKeyValueStore, MemoryKeyValueStore, MigrationError, QueuedStateWriter, StateRepository,
    StorageError, migrate_state,
};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
