//! Clock port for time-related operations

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// This abstraction allows testing time-dependent code by providing
/// a mock implementation.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as epoch milliseconds, the unit stored on
    /// profiles and export files.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}
