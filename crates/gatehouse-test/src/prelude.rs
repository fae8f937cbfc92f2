//! Prelude module - commonly used test utilities.
//!
//! ```rust
//! use gatehouse_test::prelude::*;
//! ```

pub use crate::fixtures::*;
pub use crate::{FailingGateStore, FailingKvStore, FixedClock, GateHarness, init_test_logging};
