//! Gatehouse Storage - persistence for the gate engine.
//!
//! Two tiers:
//!
//! # Tier 1: Raw Key-Value ([`KvStore`])
//!
//! Namespaced byte storage. [`MemoryKvStore`] is always available; the
//! persistent [`SurrealKvStore`] (embedded, ACID, LSM-tree) is enabled with
//! the **`kv`** feature.
//!
//! # Tier 2: Gate Records ([`GateStore`])
//!
//! Identities, tenants, and the write-once audit trail. [`KvGateStore`]
//! implements it over any [`KvStore`], so the same code runs against memory
//! in tests and SurrealKV in production.
//!
//! # Feature Flags
//!
//! - **`kv`** - `SurrealKV` raw key-value store

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod gate;
pub mod kv;
pub mod kv_gate;

pub use error::{StorageError, StorageResult};
pub use gate::{AuditQuery, AuditScope, GateStore};
pub use kv::{KvStore, MemoryKvStore, ScopedKvStore};
pub use kv_gate::KvGateStore;

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
