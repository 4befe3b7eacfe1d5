//! OpenHeaders Application - State store, history and background scheduling
//!
//! This crate defines the application layer with:
//! - Port traits (storage, browser sinks, clock)
//! - The state store every UI mutation goes through, with undo/redo
//! - The background context and its coalescing update scheduler
//! - Application-level error handling

pub mod background;
pub mod error;
pub mod history;
pub mod ports;
pub mod scheduler;
pub mod store;

pub use background::{BackgroundContext, BackgroundEvent};
pub use error::{ApplicationError, ApplicationResult};
pub use history::{HistoryManager, MAX_HISTORY};
pub use ports::{
    Appearance, AppearanceSink, Clock, KeyValueStore, RuleSink, STATE_KEY, StatePersister,
    StorageChange,
};
pub use scheduler::{
    Coalescer, RuntimeMessage, SchedulerHandle, UpdateScheduler, forward_state_changes,
};
pub use store::{FilterPatch, HeaderPatch, ProfilePatch, StateStore};
