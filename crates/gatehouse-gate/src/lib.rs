//! Gatehouse Gate - scan verification and authorization.
//!
//! This crate provides:
//! - [`CredentialResolver`]: static identifiers and signed dynamic QR tokens
//! - [`decision::evaluate`]: the ordered allow/deny checks
//! - [`GateEngine`]: resolve, decide, and audit every scan exactly once
//! - [`Verdict`]: what the gate shows
//!
//! # Security Model
//!
//! The engine fails closed. Unknown, forged, stale, or malformed credentials
//! are denied with `INVALID_TOKEN`; a scanning actor of one tenant cannot
//! admit an identity of another; every attempt is on the audit trail before
//! its verdict is returned.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gatehouse_core::{Identity, IdentityId, Role, TenantId, Timestamp};
//! use gatehouse_gate::{GateEngine, ScanRequest};
//! use gatehouse_storage::{GateStore, KvGateStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(KvGateStore::in_memory().unwrap());
//! let valid_until = Timestamp::now().checked_add_days(30).unwrap();
//! store
//!     .save_identity(
//!         &Identity::new(IdentityId(1), "Ada", "card-1", Role::Student, valid_until)
//!             .with_tenant(TenantId(1)),
//!     )
//!     .await
//!     .unwrap();
//!
//! let guard = Identity::new(IdentityId(2), "Gus", "grd-2", Role::Guard, valid_until)
//!     .with_tenant(TenantId(1));
//! let engine = GateEngine::builder(store).build();
//! let verdict = engine.scan(&guard, &ScanRequest::new("card-1", "north-gate")).await;
//! assert!(verdict.is_allowed());
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod decision;
mod engine;
mod error;
mod resolver;
pub mod verdict;

pub use engine::{GateEngine, GateEngineBuilder, ScanRequest};
pub use error::{GateError, GateResult};
pub use resolver::{CredentialMode, CredentialResolver, ResolutionMethod, ResolvedIdentity};
pub use verdict::Verdict;
