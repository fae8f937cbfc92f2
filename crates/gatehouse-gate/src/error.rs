//! Gate error types.

use thiserror::Error;

/// Errors that abort a scan decision.
///
/// A denied scan is not an error: it is an `Ok` verdict. These are internal
/// failures, which the gate-facing [`scan`](crate::GateEngine::scan) turns into
/// a `"System Error"` verdict.
#[derive(Debug, Error)]
pub enum GateError {
    /// The record store failed while resolving a credential.
    #[error("storage error: {0}")]
    StorageError(#[from] gatehouse_storage::StorageError),

    /// The audit record could not be written, or a history query failed.
    #[error("audit error: {0}")]
    AuditError(#[from] gatehouse_audit::AuditError),
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
