//! Verdicts returned to the gate.

use gatehouse_core::{AccessStatus, DenialReason, Identity, ScanOutcome};
use serde::Serialize;

/// Name and role shown when no identity was resolved.
pub const UNKNOWN: &str = "Unknown";

/// Message for a blank scan.
pub const MSG_EMPTY_TOKEN: &str = "Empty Token";
/// Message for an unknown, forged, or stale credential.
pub const MSG_INVALID_TOKEN: &str = "Invalid or Expired Token";
/// Message for a cross-tenant scan.
pub const MSG_WRONG_CAMPUS: &str = "Restricted: Wrong Campus";
/// Message for an inactive identity.
pub const MSG_SUSPENDED: &str = "Account Suspended";
/// Message for a lapsed credential.
pub const MSG_EXPIRED: &str = "Card Expired";
/// Message for an allowed scan.
pub const MSG_GRANTED: &str = "Access Granted";
/// Message when the scan could not be processed.
pub const MSG_SYSTEM_ERROR: &str = "System Error";

/// Outcome of one scan as shown to the gate.
///
/// Serializes as `{ status, identityName, role, message }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Gate outcome.
    pub status: AccessStatus,
    /// Resolved identity name, or `"Unknown"`.
    pub identity_name: String,
    /// Resolved identity role, or `"Unknown"`.
    pub role: String,
    /// Human-readable message.
    pub message: String,
    /// Reason code, kept for callers but not part of the wire shape.
    #[serde(skip)]
    pub reason: Option<DenialReason>,
}

impl Verdict {
    /// Verdict for a decided outcome.
    #[must_use]
    pub fn for_outcome(outcome: ScanOutcome, identity: Option<&Identity>) -> Self {
        let message = match outcome {
            ScanOutcome::Allowed => MSG_GRANTED,
            ScanOutcome::Denied(DenialReason::InvalidToken) => MSG_INVALID_TOKEN,
            ScanOutcome::Denied(DenialReason::WrongCampus) => MSG_WRONG_CAMPUS,
            ScanOutcome::Denied(DenialReason::Suspended) => MSG_SUSPENDED,
            ScanOutcome::Denied(DenialReason::Expired) => MSG_EXPIRED,
        };
        let (identity_name, role) = match identity {
            Some(identity) => (identity.name.clone(), identity.role.to_string()),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };
        Self {
            status: outcome.status(),
            identity_name,
            role,
            message: message.to_string(),
            reason: outcome.reason(),
        }
    }

    /// Verdict for a blank scan.
    #[must_use]
    pub fn empty_token() -> Self {
        Self::denied_unknown(DenialReason::InvalidToken, MSG_EMPTY_TOKEN)
    }

    /// Verdict for a scan that failed internally.
    #[must_use]
    pub fn system_error() -> Self {
        Self::denied_unknown(DenialReason::InvalidToken, MSG_SYSTEM_ERROR)
    }

    fn denied_unknown(reason: DenialReason, message: &str) -> Self {
        Self {
            status: AccessStatus::Denied,
            identity_name: UNKNOWN.to_string(),
            role: UNKNOWN.to_string(),
            message: message.to_string(),
            reason: Some(reason),
        }
    }

    /// Whether the gate should open.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.status == AccessStatus::Allowed
    }
}
