//! [`GateStore`] on top of any [`KvStore`].
//!
//! # Layout
//!
//! | Namespace | Key | Value |
//! |-----------|-----|-------|
//! | `gate:identities` | identity id | `Identity` |
//! | `gate:credentials` | credential identifier | identity id |
//! | `gate:tenants` | tenant id | `Tenant` |
//! | `gate:tenant-names` | tenant name | tenant id |
//! | `gate:tenant-packages` | package id | tenant id |
//! | `gate:audit:records` | audit key | `AuditRecord` |
//! | `gate:audit:tenant:{id}` | audit key | record id |
//! | `gate:audit:identity:{id}` | audit key | record id |
//!
//! Audit keys are `{epoch_millis:020}-{record_id}`, so lexical order is
//! chronological order. Each audit write touches only keys of its own, so
//! concurrent scans never contend on a shared index entry.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::{AuditRecord, Identity, IdentityId, Tenant, TenantId, Timestamp};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::gate::{AuditQuery, AuditScope, GateStore};
use crate::kv::{KvStore, MemoryKvStore, ScopedKvStore, validate_key};

const NS_IDENTITIES: &str = "gate:identities";
const NS_CREDENTIALS: &str = "gate:credentials";
const NS_TENANTS: &str = "gate:tenants";
const NS_TENANT_NAMES: &str = "gate:tenant-names";
const NS_TENANT_PACKAGES: &str = "gate:tenant-packages";
const NS_AUDIT_RECORDS: &str = "gate:audit:records";

/// Sortable audit key for a record.
///
/// Pre-epoch timestamps have no sortable key and are rejected.
fn audit_key(record: &AuditRecord) -> StorageResult<String> {
    let millis = u64::try_from(record.timestamp.as_millis()).map_err(|_| {
        StorageError::InvalidKey(format!(
            "audit record {} predates the epoch",
            record.id
        ))
    })?;
    Ok(format!("{millis:020}-{}", record.id))
}

/// Key bounds `[lower, upper)` covering every audit key stamped in
/// `[start, end]`. Pre-epoch bounds clamp to the epoch, where no record can be.
fn audit_key_bounds(start: Timestamp, end: Timestamp) -> (String, String) {
    let millis = |at: Timestamp| u64::try_from(at.as_millis()).unwrap_or(0);
    // `.` sorts right after the `-` separator.
    (
        format!("{:020}-", millis(start)),
        format!("{:020}.", millis(end)),
    )
}

/// Gate record store over a namespaced KV backend.
#[derive(Clone)]
pub struct KvGateStore {
    backend: Arc<dyn KvStore>,
    identities: ScopedKvStore,
    credentials: ScopedKvStore,
    tenants: ScopedKvStore,
    tenant_names: ScopedKvStore,
    tenant_packages: ScopedKvStore,
    audit: ScopedKvStore,
}

impl std::fmt::Debug for KvGateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvGateStore").finish_non_exhaustive()
    }
}

impl KvGateStore {
    /// Build the store over `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if a namespace cannot be bound.
    pub fn new(backend: Arc<dyn KvStore>) -> StorageResult<Self> {
        let scoped = |ns: &str| ScopedKvStore::new(Arc::clone(&backend), ns);
        Ok(Self {
            identities: scoped(NS_IDENTITIES)?,
            credentials: scoped(NS_CREDENTIALS)?,
            tenants: scoped(NS_TENANTS)?,
            tenant_names: scoped(NS_TENANT_NAMES)?,
            tenant_packages: scoped(NS_TENANT_PACKAGES)?,
            audit: scoped(NS_AUDIT_RECORDS)?,
            backend,
        })
    }

    /// A store backed by a fresh [`MemoryKvStore`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if a namespace cannot be bound.
    pub fn in_memory() -> StorageResult<Self> {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    fn audit_index(&self, scope: AuditScope) -> StorageResult<ScopedKvStore> {
        let namespace = match scope {
            AuditScope::All => return Ok(self.audit.clone()),
            AuditScope::Tenant(id) => format!("gate:audit:tenant:{}", id.0),
            AuditScope::Identity(id) => format!("gate:audit:identity:{}", id.0),
        };
        ScopedKvStore::new(Arc::clone(&self.backend), namespace)
    }

    /// Claim a unique value for `owner`. Idempotent for the current owner.
    async fn claim<T>(
        index: &ScopedKvStore,
        value: &str,
        owner: &T,
        what: &str,
    ) -> StorageResult<()>
    where
        T: Serialize + DeserializeOwned + PartialEq + Send + Sync,
    {
        if index.insert_json(value, owner).await? {
            return Ok(());
        }
        match index.get_json::<T>(value).await? {
            Some(existing) if existing == *owner => Ok(()),
            _ => Err(StorageError::Conflict(format!(
                "{what} is already assigned to another record"
            ))),
        }
    }

    /// Best-effort removal of index entries written for a failed audit insert.
    async fn unindex(indexes: &[ScopedKvStore], key: &str) {
        for index in indexes {
            if let Err(e) = index.delete(key).await {
                warn!(
                    namespace = index.namespace(),
                    key,
                    error = %e,
                    "Failed to remove audit index entry"
                );
            }
        }
    }
}

#[async_trait]
impl GateStore for KvGateStore {
    async fn identity_by_credential(&self, credential_id: &str) -> StorageResult<Option<Identity>> {
        // Not a storable key, so no identity can own it.
        if validate_key(credential_id).is_err() {
            return Ok(None);
        }
        let Some(id) = self.credentials.get_json::<IdentityId>(credential_id).await? else {
            debug!("No identity for credential");
            return Ok(None);
        };
        let identity = self.identity_by_id(id).await?;
        Ok(identity.filter(|i| i.credential_id == credential_id))
    }

    async fn identity_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>> {
        self.identities.get_json(&id.to_string()).await
    }

    async fn tenant_by_id(&self, id: TenantId) -> StorageResult<Option<Tenant>> {
        self.tenants.get_json(&id.0.to_string()).await
    }

    async fn save_identity(&self, identity: &Identity) -> StorageResult<()> {
        let key = identity.id.to_string();
        let previous: Option<Identity> = self.identities.get_json(&key).await?;

        Self::claim(
            &self.credentials,
            &identity.credential_id,
            &identity.id,
            "credential identifier",
        )
        .await?;
        if let Some(prev) = previous
            && prev.credential_id != identity.credential_id
        {
            self.credentials.delete(&prev.credential_id).await?;
        }

        self.identities.set_json(&key, identity).await?;
        debug!(identity_id = %identity.id, "Saved identity");
        Ok(())
    }

    async fn save_tenant(&self, tenant: &Tenant) -> StorageResult<()> {
        let key = tenant.id.0.to_string();
        let previous: Option<Tenant> = self.tenants.get_json(&key).await?;

        Self::claim(&self.tenant_names, &tenant.name, &tenant.id, "tenant name").await?;
        if let Some(package_id) = &tenant.package_id
            && let Err(e) =
                Self::claim(&self.tenant_packages, package_id, &tenant.id, "package id").await
        {
            let name_was_ours = previous.as_ref().is_some_and(|p| p.name == tenant.name);
            if !name_was_ours {
                self.tenant_names.delete(&tenant.name).await?;
            }
            return Err(e);
        }
        if let Some(prev) = previous {
            if prev.name != tenant.name {
                self.tenant_names.delete(&prev.name).await?;
            }
            if let Some(old_package) = prev.package_id
                && tenant.package_id.as_deref() != Some(old_package.as_str())
            {
                self.tenant_packages.delete(&old_package).await?;
            }
        }

        self.tenants.set_json(&key, tenant).await?;
        debug!(tenant_id = %tenant.id, "Saved tenant");
        Ok(())
    }

    async fn delete_identity(&self, id: IdentityId) -> StorageResult<bool> {
        let key = id.to_string();
        let Some(identity) = self.identities.get_json::<Identity>(&key).await? else {
            return Ok(false);
        };
        if self
            .credentials
            .get_json::<IdentityId>(&identity.credential_id)
            .await?
            == Some(id)
        {
            self.credentials.delete(&identity.credential_id).await?;
        }
        self.identities.delete(&key).await
    }

    async fn insert_audit_record(&self, record: &AuditRecord) -> StorageResult<()> {
        let key = audit_key(record)?;

        let mut indexes = Vec::with_capacity(2);
        if let Some(tenant_id) = record.snapshot.tenant_id {
            indexes.push(self.audit_index(AuditScope::Tenant(tenant_id))?);
        }
        if let Some(identity_id) = record.identity_id {
            indexes.push(self.audit_index(AuditScope::Identity(identity_id))?);
        }

        // Index entries go first and the record last: queries load through the
        // record, so a write that fails part-way leaves nothing visible.
        let marker = record.id.to_string().into_bytes();
        for (written, index) in indexes.iter().enumerate() {
            if let Err(e) = index.set(&key, marker.clone()).await {
                Self::unindex(&indexes[..written], &key).await;
                return Err(e);
            }
        }

        match self.audit.insert_json(&key, record).await {
            Ok(true) => Ok(()),
            // Same key means same record ID; the index entries already point at it.
            Ok(false) => Err(StorageError::Conflict(format!(
                "audit record {} already exists",
                record.id
            ))),
            Err(e) => {
                Self::unindex(&indexes, &key).await;
                Err(e)
            },
        }
    }

    async fn query_audit_records(&self, query: &AuditQuery) -> StorageResult<Vec<AuditRecord>> {
        if query.limit == 0 || query.start > query.end {
            return Ok(Vec::new());
        }
        let index = self.audit_index(query.scope)?;
        let (lower, mut upper) = audit_key_bounds(query.start, query.end);

        let mut records = Vec::new();
        loop {
            let wanted = query.limit.saturating_sub(records.len());
            let keys = index.list_keys_desc(&lower, &upper, wanted).await?;
            let exhausted = keys.len() < wanted;

            for key in &keys {
                match self.audit.get_json::<AuditRecord>(key).await? {
                    Some(record) if query.contains(record.timestamp) => records.push(record),
                    Some(_) => {},
                    // Left behind by a write that failed before its record landed.
                    None => debug!(key = %key, "Audit index entry without record"),
                }
            }

            match keys.last() {
                Some(last) if !exhausted && records.len() < query.limit => {
                    upper.clone_from(last);
                },
                _ => break,
            }
        }
        Ok(records)
    }
}
