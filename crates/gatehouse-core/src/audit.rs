//! Audit record types.
//!
//! One [`AuditRecord`] is written for every scan attempt. Records are
//! write-once: the engine never mutates or deletes them, and the identity
//! fields they show come from a [`IdentitySnapshot`] taken at scan time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{Identity, Role};
use crate::types::{AuditRecordId, IdentityId, TenantId, Timestamp};

/// Credential label recorded for scans resolved through a signed QR token.
pub const DYNAMIC_QR_LABEL: &str = "DYNAMIC-QR";

/// Name recorded when no identity could be resolved.
const UNKNOWN_NAME: &str = "Unknown";

/// Gate outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    /// The gate opened.
    Allowed,
    /// The gate stayed closed.
    Denied,
}

impl AccessStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::Denied => "DENIED",
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a scan was denied. A closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Blank, unknown, forged, or stale credential.
    InvalidToken,
    /// Identity belongs to a different tenant than the scanning actor.
    WrongCampus,
    /// Identity is not active.
    Suspended,
    /// Identity validity has lapsed.
    Expired,
}

impl DenialReason {
    /// Wire name of the reason code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::WrongCampus => "WRONG_CAMPUS",
            Self::Suspended => "SUSPENDED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a scan as handed to the audit logger.
///
/// Pairs the status with its reason so an allowed scan can never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Access granted.
    Allowed,
    /// Access denied for the given reason.
    Denied(DenialReason),
}

impl ScanOutcome {
    /// The gate status.
    #[must_use]
    pub const fn status(&self) -> AccessStatus {
        match self {
            Self::Allowed => AccessStatus::Allowed,
            Self::Denied(_) => AccessStatus::Denied,
        }
    }

    /// The denial reason, if denied.
    #[must_use]
    pub const fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Identity fields copied into an audit record at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// Display name, or `"Unknown"`.
    pub name: String,
    /// Contact address.
    pub contact: Option<String>,
    /// Role at scan time.
    pub role: Option<Role>,
    /// Owning tenant at scan time.
    pub tenant_id: Option<TenantId>,
}

impl IdentitySnapshot {
    /// Snapshot of an identity.
    #[must_use]
    pub fn of(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            contact: identity.email.clone(),
            role: Some(identity.role),
            tenant_id: identity.tenant_id,
        }
    }

    /// Snapshot for a scan that resolved to no identity.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            contact: None,
            role: None,
            tenant_id: None,
        }
    }
}

/// A single, immutable record of a scan attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record identifier.
    pub id: AuditRecordId,
    /// Weak link to the scanned identity. May dangle after the identity is deleted.
    pub identity_id: Option<IdentityId>,
    /// Identity fields as they were at scan time.
    pub snapshot: IdentitySnapshot,
    /// `"DYNAMIC-QR"` for dynamic resolutions, otherwise the literal scan string.
    pub credential_label: String,
    /// Gate or device identifier.
    pub gate_id: String,
    /// Scan time.
    pub timestamp: Timestamp,
    /// Gate outcome.
    pub status: AccessStatus,
    /// Denial reason, present iff `status` is `Denied`.
    pub reason: Option<DenialReason>,
}

impl AuditRecord {
    /// Build a new record for a scan attempt.
    #[must_use]
    pub fn new(
        outcome: ScanOutcome,
        gate_id: impl Into<String>,
        identity: Option<&Identity>,
        credential_label: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: AuditRecordId::new(),
            identity_id: identity.map(|i| i.id),
            snapshot: identity.map_or_else(IdentitySnapshot::unknown, IdentitySnapshot::of),
            credential_label: credential_label.into(),
            gate_id: gate_id.into(),
            timestamp,
            status: outcome.status(),
            reason: outcome.reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new(
            IdentityId(3),
            "Grace",
            "card-3",
            Role::Student,
            Timestamp::now(),
        )
        .with_email("grace@example.edu")
        .with_tenant(TenantId(9))
    }

    #[test]
    fn test_allowed_record_has_no_reason() {
        let id = identity();
        let record = AuditRecord::new(
            ScanOutcome::Allowed,
            "north-gate",
            Some(&id),
            "card-3",
            Timestamp::now(),
        );
        assert_eq!(record.status, AccessStatus::Allowed);
        assert!(record.reason.is_none());
        assert_eq!(record.identity_id, Some(IdentityId(3)));
        assert_eq!(record.snapshot.contact.as_deref(), Some("grace@example.edu"));
        assert_eq!(record.snapshot.tenant_id, Some(TenantId(9)));
    }

    #[test]
    fn test_unknown_snapshot() {
        let record = AuditRecord::new(
            ScanOutcome::Denied(DenialReason::InvalidToken),
            "north-gate",
            None,
            "garbage",
            Timestamp::now(),
        );
        assert_eq!(record.snapshot.name, "Unknown");
        assert_eq!(record.reason, Some(DenialReason::InvalidToken));
        assert!(record.identity_id.is_none());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut id = identity();
        let record = AuditRecord::new(
            ScanOutcome::Denied(DenialReason::Suspended),
            "g",
            Some(&id),
            "card-3",
            Timestamp::now(),
        );
        id.name = "Renamed".to_string();
        assert_eq!(record.snapshot.name, "Grace");
    }

    #[test]
    fn test_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&DenialReason::WrongCampus).unwrap(),
            "\"WRONG_CAMPUS\""
        );
        assert_eq!(DenialReason::InvalidToken.as_str(), "INVALID_TOKEN");
        assert_eq!(AccessStatus::Denied.to_string(), "DENIED");
    }
}
