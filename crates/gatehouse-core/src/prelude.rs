//! Prelude module - commonly used types for convenient import.
//!
//! Use `use gatehouse_core::prelude::*;` to import all essential types.

// Identifiers and time
pub use crate::{AuditRecordId, IdentityId, TenantId, Timestamp};

// Enrolled records
pub use crate::{Identity, Role, SigningSecret, Tenant};

// Audit records
pub use crate::{AccessStatus, AuditRecord, DenialReason, IdentitySnapshot, ScanOutcome};

// Time source
pub use crate::{Clock, SystemClock};
