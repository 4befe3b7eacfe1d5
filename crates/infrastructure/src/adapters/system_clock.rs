//! System clock adapter

use chrono::{DateTime, Utc};
use openheaders_application::Clock;

/// System clock implementation using the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_agree_with_now() {
        let clock = SystemClock::new();
        let before = clock.now().timestamp_millis();
        let millis = clock.now_millis();
        assert!(millis >= before);
        assert!(millis > 1_600_000_000_000);
    }
}
