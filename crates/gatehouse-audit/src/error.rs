//! Audit-related error types.

use gatehouse_core::Role;
use thiserror::Error;

/// Errors that can occur with audit logging and history queries.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Storage error. A failed audit write fails the scan.
    #[error("storage error: {0}")]
    StorageError(#[from] gatehouse_storage::StorageError),

    /// The actor's role may not read gate-wide history.
    #[error("role {role} is not allowed to view gate history")]
    Unauthorized {
        /// The actor's role.
        role: Role,
    },

    /// The actor's record is inconsistent with its role.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Malformed history query (zero limit, inverted window).
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
