//! Gatehouse Test - Shared test utilities.
//!
//! Fixtures, mocks, and a ready-wired engine for use as a dev-dependency.
//!
//! ```toml
//! [dev-dependencies]
//! gatehouse-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use gatehouse_test::{GateHarness, NORTH, test_guard, test_student};
//!
//! #[tokio::test]
//! async fn test_student_enters() {
//!     let harness = GateHarness::new().await;
//!     let student = harness.enroll(test_student(10, NORTH)).await;
//!     let verdict = harness.scan(&test_guard(20, NORTH), &student.credential_id).await;
//!     assert!(verdict.is_allowed());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;

/// Install a test-writer subscriber filtered by `RUST_LOG`. Safe to call
/// repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
