//! Mock implementations for testing.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gatehouse_core::{AuditRecord, Clock, Identity, IdentityId, Tenant, TenantId, Timestamp};
use gatehouse_storage::{AuditQuery, GateStore, KvStore, StorageError, StorageResult};

use crate::fixtures::{TEST_NOW_MILLIS, ts};

/// Settable clock.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// A clock stopped at `at`.
    #[must_use]
    pub fn new(at: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(at.as_millis()),
        }
    }

    /// Move the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.as_millis(), Ordering::SeqCst);
    }

    /// Move the clock forward (or back, for negative `millis`).
    pub fn advance_millis(&self, millis: i64) {
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |m| {
                Some(m.saturating_add(millis))
            });
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self {
            millis: AtomicI64::new(TEST_NOW_MILLIS),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        ts(self.millis.load(Ordering::SeqCst))
    }
}

fn injected(what: &str) -> StorageError {
    StorageError::Connection(format!("injected {what} failure"))
}

/// [`KvStore`] wrapper that fails operations on selected namespaces.
///
/// A namespace is affected when it starts with one of the registered
/// prefixes.
#[derive(Debug, Clone)]
pub struct FailingKvStore<S> {
    inner: S,
    fail_reads: Arc<Mutex<Vec<String>>>,
    fail_writes: Arc<Mutex<Vec<String>>>,
}

impl<S: KvStore> FailingKvStore<S> {
    /// Wrap `inner`; nothing fails until configured.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_reads: Arc::new(Mutex::new(Vec::new())),
            fail_writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail `get` and key listing on namespaces under `prefix`.
    pub fn fail_reads_from(&self, prefix: impl Into<String>) {
        self.fail_reads.lock().unwrap().push(prefix.into());
    }

    /// Fail `set`, `insert_new`, and `delete` on namespaces under `prefix`.
    pub fn fail_writes_to(&self, prefix: impl Into<String>) {
        self.fail_writes.lock().unwrap().push(prefix.into());
    }

    /// Stop failing anything.
    pub fn heal(&self) {
        self.fail_reads.lock().unwrap().clear();
        self.fail_writes.lock().unwrap().clear();
    }

    fn check(list: &Mutex<Vec<String>>, namespace: &str, what: &str) -> StorageResult<()> {
        if list.lock().unwrap().iter().any(|p| namespace.starts_with(p.as_str())) {
            return Err(injected(what));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: KvStore> KvStore for FailingKvStore<S> {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Self::check(&self.fail_reads, namespace, "read")?;
        self.inner.get(namespace, key).await
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        Self::check(&self.fail_writes, namespace, "write")?;
        self.inner.set(namespace, key, value).await
    }

    async fn insert_new(
        &self,
        namespace: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<bool> {
        Self::check(&self.fail_writes, namespace, "write")?;
        self.inner.insert_new(namespace, key, value).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        Self::check(&self.fail_writes, namespace, "write")?;
        self.inner.delete(namespace, key).await
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        Self::check(&self.fail_reads, namespace, "read")?;
        self.inner.list_keys(namespace).await
    }

    async fn list_keys_desc(
        &self,
        namespace: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        Self::check(&self.fail_reads, namespace, "read")?;
        self.inner.list_keys_desc(namespace, start, end, limit).await
    }
}

/// [`GateStore`] wrapper with switchable lookup and audit-write failures.
#[derive(Debug, Clone)]
pub struct FailingGateStore<S> {
    inner: S,
    fail_lookups: Arc<AtomicBool>,
    fail_audit_writes: Arc<AtomicBool>,
}

impl<S: GateStore> FailingGateStore<S> {
    /// Wrap `inner`; nothing fails until configured.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_lookups: Arc::new(AtomicBool::new(false)),
            fail_audit_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggle failures of identity and tenant lookups.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Toggle failures of audit record inserts.
    pub fn set_fail_audit_writes(&self, fail: bool) {
        self.fail_audit_writes.store(fail, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn lookup_guard(&self) -> StorageResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(injected("lookup"));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: GateStore> GateStore for FailingGateStore<S> {
    async fn identity_by_credential(&self, credential_id: &str) -> StorageResult<Option<Identity>> {
        self.lookup_guard()?;
        self.inner.identity_by_credential(credential_id).await
    }

    async fn identity_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>> {
        self.lookup_guard()?;
        self.inner.identity_by_id(id).await
    }

    async fn tenant_by_id(&self, id: TenantId) -> StorageResult<Option<Tenant>> {
        self.lookup_guard()?;
        self.inner.tenant_by_id(id).await
    }

    async fn save_identity(&self, identity: &Identity) -> StorageResult<()> {
        self.inner.save_identity(identity).await
    }

    async fn save_tenant(&self, tenant: &Tenant) -> StorageResult<()> {
        self.inner.save_tenant(tenant).await
    }

    async fn delete_identity(&self, id: IdentityId) -> StorageResult<bool> {
        self.inner.delete_identity(id).await
    }

    async fn insert_audit_record(&self, record: &AuditRecord) -> StorageResult<()> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(injected("audit write"));
        }
        self.inner.insert_audit_record(record).await
    }

    async fn query_audit_records(&self, query: &AuditQuery) -> StorageResult<Vec<AuditRecord>> {
        self.inner.query_audit_records(query).await
    }
}
