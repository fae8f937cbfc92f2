//! Gatehouse Core - Foundation types for the gate access engine.
//!
//! This crate provides:
//! - Identifiers and timestamps shared by every other crate
//! - The enrolled [`Identity`] and [`Tenant`] records
//! - The closed [`Role`] enumeration used for policy decisions
//! - Write-once [`AuditRecord`]s with their identity snapshot
//! - A [`Clock`] abstraction so time-windowed checks can be tested
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use gatehouse_core::{Identity, IdentityId, Role, TenantId, Timestamp};
//!
//! let valid_until = Timestamp::from_datetime(Utc::now() + Duration::days(365));
//! let student = Identity::new(IdentityId(7), "Ada", "card-0007", Role::Student, valid_until)
//!     .with_tenant(TenantId(1));
//!
//! assert!(student.active);
//! assert!(!student.is_expired_at(Timestamp::now()));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod audit;
pub mod clock;
pub mod identity;
pub mod types;

pub use audit::{
    AccessStatus, AuditRecord, DYNAMIC_QR_LABEL, DenialReason, IdentitySnapshot, ScanOutcome,
};
pub use clock::{Clock, SystemClock};
pub use identity::{Identity, Role, RoleParseError, SigningSecret, Tenant};
pub use types::{AuditRecordId, IdentityId, TenantId, Timestamp};
