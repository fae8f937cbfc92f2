//! Time source abstraction.

use std::fmt;

use crate::types::Timestamp;

/// Source of "now" for time-windowed checks (QR freshness, expiry, history windows).
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
