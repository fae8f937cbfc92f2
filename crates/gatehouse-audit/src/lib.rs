//! Gatehouse Audit - the scan audit trail and access history.
//!
//! This crate provides:
//! - [`AuditLogger`]: one write-once record per scan attempt, with an identity
//!   snapshot copied at write time
//! - [`HistoryQueryService`]: newest-first, windowed, role-scoped history
//!
//! # Security Model
//!
//! Audit writes are not best-effort. A scan whose record cannot be written
//! fails, so no gate decision goes unrecorded. History visibility is derived
//! from the actor's role with an exhaustive match: only administrators see
//! gate-wide records, and a campus admin never sees another tenant's records.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gatehouse_audit::AuditLogger;
//! use gatehouse_core::{DenialReason, ScanOutcome, SystemClock};
//! use gatehouse_storage::KvGateStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(KvGateStore::in_memory().unwrap());
//! let logger = AuditLogger::new(store, Arc::new(SystemClock));
//! let record = logger
//!     .record(ScanOutcome::Denied(DenialReason::InvalidToken), "north-gate", None, "???")
//!     .await
//!     .unwrap();
//! assert_eq!(record.snapshot.name, "Unknown");
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod history;
mod logger;
mod view;

pub use error::{AuditError, AuditResult};
pub use history::{
    DEFAULT_LIMIT, DEFAULT_PERSONAL_WINDOW_DAYS, DEFAULT_WINDOW_DAYS, HistoryConfig,
    HistoryQueryService, HistoryScope, MAX_LIMIT,
};
pub use logger::AuditLogger;
pub use view::AuditRecordView;
