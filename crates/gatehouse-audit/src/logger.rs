//! Audit logger - writes one immutable record per scan attempt.

use std::sync::Arc;

use gatehouse_core::{AuditRecord, Clock, Identity, ScanOutcome, Timestamp};
use gatehouse_storage::GateStore;
use tracing::{debug, error};

use crate::error::AuditResult;

/// Records scan attempts through a [`GateStore`].
///
/// Not best-effort: if the write fails the error is returned and the scan
/// must fail with it.
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn GateStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AuditLogger {
    /// Create a logger writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn GateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record a scan attempt at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::StorageError`](crate::AuditError::StorageError) if the write fails.
    pub async fn record(
        &self,
        outcome: ScanOutcome,
        gate_id: &str,
        identity: Option<&Identity>,
        credential_label: &str,
    ) -> AuditResult<AuditRecord> {
        self.record_at(outcome, gate_id, identity, credential_label, self.clock.now())
            .await
    }

    /// Record a scan attempt decided at `at`.
    ///
    /// The identity snapshot is copied now; later changes to the identity do
    /// not affect the record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::StorageError`](crate::AuditError::StorageError) if the write fails.
    pub async fn record_at(
        &self,
        outcome: ScanOutcome,
        gate_id: &str,
        identity: Option<&Identity>,
        credential_label: &str,
        at: Timestamp,
    ) -> AuditResult<AuditRecord> {
        let record = AuditRecord::new(outcome, gate_id, identity, credential_label, at);

        debug!(
            record_id = %record.id,
            gate_id = %record.gate_id,
            status = %record.status,
            reason = ?record.reason,
            "Appending audit record"
        );

        if let Err(e) = self.store.insert_audit_record(&record).await {
            error!(record_id = %record.id, error = %e, "Audit write failed");
            return Err(e.into());
        }
        Ok(record)
    }
}
