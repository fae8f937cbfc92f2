//! Client-facing projection of audit records.

use gatehouse_core::{AccessStatus, AuditRecord, AuditRecordId, DenialReason, Timestamp};
use serde::Serialize;

/// One history row as returned to clients.
///
/// Serializes as `{ id, identityName, credentialLabel, status, reason, time,
/// gateId, tenantName? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecordView {
    /// Record ID.
    pub id: AuditRecordId,
    /// Identity name from the scan-time snapshot.
    pub identity_name: String,
    /// Credential label (`"DYNAMIC-QR"` or the scanned string).
    pub credential_label: String,
    /// Gate outcome.
    pub status: AccessStatus,
    /// Denial reason, `null` when allowed.
    pub reason: Option<DenialReason>,
    /// Scan time.
    pub time: Timestamp,
    /// Gate or device identifier.
    pub gate_id: String,
    /// Name of the identity's tenant, when it still resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}

impl AuditRecordView {
    /// Project a record, attaching a resolved tenant name.
    #[must_use]
    pub fn from_record(record: AuditRecord, tenant_name: Option<String>) -> Self {
        Self {
            id: record.id,
            identity_name: record.snapshot.name,
            credential_label: record.credential_label,
            status: record.status,
            reason: record.reason,
            time: record.timestamp,
            gate_id: record.gate_id,
            tenant_name,
        }
    }
}
