//! Common types for convenient import.
//!
//! ```
//! use gatehouse_storage::prelude::*;
//! ```

pub use crate::{
    AuditQuery, AuditScope, GateStore, KvGateStore, KvStore, MemoryKvStore, ScopedKvStore,
    StorageError, StorageResult,
};
