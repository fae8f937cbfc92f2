//! The gate record store.
//!
//! [`GateStore`] is the persistence seam of the engine: identity and tenant
//! lookups for the resolver, audit writes for the logger, and time-ranged
//! audit queries for history. The engine never holds state of its own.

use async_trait::async_trait;
use gatehouse_core::{AuditRecord, Identity, IdentityId, Tenant, TenantId, Timestamp};

use crate::error::StorageResult;

/// Which audit records a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditScope {
    /// Every record.
    All,
    /// Records whose identity belonged to the tenant at scan time.
    Tenant(TenantId),
    /// Records of one identity.
    Identity(IdentityId),
}

/// A time-ranged, bounded audit query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Visibility scope.
    pub scope: AuditScope,
    /// Inclusive lower bound.
    pub start: Timestamp,
    /// Inclusive upper bound.
    pub end: Timestamp,
    /// Maximum number of records returned.
    pub limit: usize,
}

impl AuditQuery {
    /// Build a query.
    #[must_use]
    pub fn new(scope: AuditScope, start: Timestamp, end: Timestamp, limit: usize) -> Self {
        Self {
            scope,
            start,
            end,
            limit,
        }
    }

    /// Whether `at` falls inside the query window.
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Storage collaborator for the gate engine.
///
/// Lookups that find nothing return `Ok(None)`; an `Err` always means the
/// backend failed.
#[async_trait]
pub trait GateStore: Send + Sync {
    /// Identity whose stored credential identifier equals `credential_id` exactly.
    async fn identity_by_credential(&self, credential_id: &str) -> StorageResult<Option<Identity>>;

    /// Identity by numeric ID.
    async fn identity_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>>;

    /// Tenant by ID.
    async fn tenant_by_id(&self, id: TenantId) -> StorageResult<Option<Tenant>>;

    /// Insert or replace an identity.
    ///
    /// Fails with a conflict if its credential identifier belongs to another identity.
    async fn save_identity(&self, identity: &Identity) -> StorageResult<()>;

    /// Insert or replace a tenant.
    ///
    /// Fails with a conflict if its name or package identifier belongs to another tenant.
    async fn save_tenant(&self, tenant: &Tenant) -> StorageResult<()>;

    /// Remove an identity. Its audit records are kept.
    async fn delete_identity(&self, id: IdentityId) -> StorageResult<bool>;

    /// Persist a new audit record. Records are never overwritten.
    async fn insert_audit_record(&self, record: &AuditRecord) -> StorageResult<()>;

    /// Records matching `query`, newest first, at most `query.limit`.
    async fn query_audit_records(&self, query: &AuditQuery) -> StorageResult<Vec<AuditRecord>>;
}
