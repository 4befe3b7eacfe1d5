//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod browser;
mod clock;
mod storage;

pub use browser::{Appearance, AppearanceSink, RuleSink};
pub use clock::Clock;
pub use storage::{KeyValueStore, STATE_KEY, StatePersister, StorageChange};
