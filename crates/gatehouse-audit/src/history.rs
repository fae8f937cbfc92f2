//! Role-scoped access history.
//!
//! Gate-wide history is visible to administrators only: the super-admin sees
//! every record, a campus admin sees the records of its own tenant. Any
//! identity may read its own records through [`HistoryQueryService::my_history`].

use std::collections::HashMap;
use std::sync::Arc;

use gatehouse_core::{Clock, Identity, Role, TenantId, Timestamp};
use gatehouse_storage::{AuditQuery, AuditScope, GateStore};
use tracing::{debug, warn};

use crate::error::{AuditError, AuditResult};
use crate::view::AuditRecordView;

/// Default gate-wide window in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
/// Default own-history window in days.
pub const DEFAULT_PERSONAL_WINDOW_DAYS: u32 = 30;
/// Page size when the caller gives none.
pub const DEFAULT_LIMIT: usize = 50;
/// Hard upper bound on a page.
pub const MAX_LIMIT: usize = 500;

/// History windows and page bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Gate-wide default window.
    pub window_days: u32,
    /// Own-history default window.
    pub personal_window_days: u32,
    /// Page size when none is given.
    pub default_limit: usize,
    /// Requested limits above this are clamped.
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            personal_window_days: DEFAULT_PERSONAL_WINDOW_DAYS,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// Gate-wide visibility granted to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    /// Every record.
    All,
    /// Records of one tenant.
    Tenant(TenantId),
}

impl HistoryScope {
    /// Visibility for `actor`.
    ///
    /// # Errors
    ///
    /// - [`AuditError::IllegalState`] for a campus admin without a tenant
    /// - [`AuditError::Unauthorized`] for every non-admin role
    pub fn for_actor(actor: &Identity) -> AuditResult<Self> {
        match actor.role {
            Role::SuperAdmin => Ok(Self::All),
            Role::CampusAdmin => actor.tenant_id.map(Self::Tenant).ok_or_else(|| {
                AuditError::IllegalState(format!("campus admin {} has no tenant", actor.id))
            }),
            Role::Student | Role::Guard | Role::Guest => {
                Err(AuditError::Unauthorized { role: actor.role })
            },
        }
    }
}

impl From<HistoryScope> for AuditScope {
    fn from(scope: HistoryScope) -> Self {
        match scope {
            HistoryScope::All => Self::All,
            HistoryScope::Tenant(id) => Self::Tenant(id),
        }
    }
}

/// Serves history pages, newest first.
#[derive(Clone)]
pub struct HistoryQueryService {
    store: Arc<dyn GateStore>,
    clock: Arc<dyn Clock>,
    config: HistoryConfig,
}

impl std::fmt::Debug for HistoryQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryQueryService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HistoryQueryService {
    /// Create a service with default windows and limits.
    #[must_use]
    pub fn new(store: Arc<dyn GateStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, HistoryConfig::default())
    }

    /// Create a service with explicit windows and limits.
    #[must_use]
    pub fn with_config(
        store: Arc<dyn GateStore>,
        clock: Arc<dyn Clock>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Gate-wide history visible to `actor`.
    ///
    /// `end` defaults to now and `start` to `end` minus the gate-wide window.
    ///
    /// # Errors
    ///
    /// Authorization and illegal-state errors from [`HistoryScope::for_actor`],
    /// [`AuditError::InvalidQuery`] for a zero limit or an inverted window, and
    /// storage failures.
    pub async fn query(
        &self,
        actor: &Identity,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        limit: Option<usize>,
    ) -> AuditResult<Vec<AuditRecordView>> {
        let scope = match HistoryScope::for_actor(actor) {
            Ok(scope) => scope,
            Err(e) => {
                warn!(actor = %actor.id, role = %actor.role, error = %e, "History access refused");
                return Err(e);
            },
        };
        let query = self.build_query(scope.into(), start, end, limit, self.config.window_days)?;
        self.run(&query).await
    }

    /// The actor's own records. Available to every role.
    ///
    /// `start` defaults to `end` minus the own-history window.
    ///
    /// # Errors
    ///
    /// [`AuditError::InvalidQuery`] for a zero limit or an inverted window, and
    /// storage failures.
    pub async fn my_history(
        &self,
        actor: &Identity,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        limit: Option<usize>,
    ) -> AuditResult<Vec<AuditRecordView>> {
        let query = self.build_query(
            AuditScope::Identity(actor.id),
            start,
            end,
            limit,
            self.config.personal_window_days,
        )?;
        self.run(&query).await
    }

    fn build_query(
        &self,
        scope: AuditScope,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        limit: Option<usize>,
        window_days: u32,
    ) -> AuditResult<AuditQuery> {
        let limit = match limit {
            Some(0) => {
                return Err(AuditError::InvalidQuery("limit must be at least 1".into()));
            },
            Some(n) => n.min(self.config.max_limit),
            None => self.config.default_limit,
        };

        let end = end.unwrap_or_else(|| self.clock.now());
        let start = match start {
            Some(start) => start,
            None => end.checked_sub_days(window_days).ok_or_else(|| {
                AuditError::InvalidQuery("history window is out of range".into())
            })?,
        };
        if start > end {
            return Err(AuditError::InvalidQuery(format!(
                "start {start} is after end {end}"
            )));
        }

        Ok(AuditQuery::new(scope, start, end, limit))
    }

    async fn run(&self, query: &AuditQuery) -> AuditResult<Vec<AuditRecordView>> {
        let records = self.store.query_audit_records(query).await?;
        debug!(
            scope = ?query.scope,
            start = %query.start,
            end = %query.end,
            returned = records.len(),
            "History query"
        );

        let mut tenant_names: HashMap<TenantId, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let tenant_name = match record.snapshot.tenant_id {
                Some(id) => {
                    if let Some(name) = tenant_names.get(&id) {
                        name.clone()
                    } else {
                        let name = self.store.tenant_by_id(id).await?.map(|t| t.name);
                        tenant_names.insert(id, name.clone());
                        name
                    }
                },
                None => None,
            };
            views.push(AuditRecordView::from_record(record, tenant_name));
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{AuditRecord, IdentityId, ScanOutcome, Tenant};
    use gatehouse_storage::KvGateStore;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    #[derive(Debug)]
    struct At(Timestamp);

    impl Clock for At {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(1_700_000_000_000).unwrap()
    }

    fn ago(ms: i64) -> Timestamp {
        Timestamp::from_millis(now().as_millis() - ms).unwrap()
    }

    fn person(id: u64, role: Role, tenant: Option<u64>) -> Identity {
        let identity = Identity::new(IdentityId(id), format!("p{id}"), format!("c{id}"), role, now());
        match tenant {
            Some(t) => identity.with_tenant(TenantId(t)),
            None => identity,
        }
    }

    async fn seeded() -> (HistoryQueryService, Arc<KvGateStore>) {
        let store = Arc::new(KvGateStore::in_memory().unwrap());
        store
            .save_tenant(&Tenant::new(TenantId(1), "Tech"))
            .await
            .unwrap();
        store
            .save_tenant(&Tenant::new(TenantId(2), "Arts"))
            .await
            .unwrap();

        let a = person(10, Role::Student, Some(1));
        let b = person(20, Role::Student, Some(2));
        for (who, at) in [
            (&a, ago(1_000)),
            (&b, ago(2_000)),
            (&a, ago(3_000)),
            (&a, ago(8 * DAY_MS)),
            (&a, ago(40 * DAY_MS)),
        ] {
            store
                .insert_audit_record(&AuditRecord::new(
                    ScanOutcome::Allowed,
                    "north-gate",
                    Some(who),
                    who.credential_id.as_str(),
                    at,
                ))
                .await
                .unwrap();
        }

        let service = HistoryQueryService::new(store.clone(), Arc::new(At(now())));
        (service, store)
    }

    #[test]
    fn test_scope_for_every_role() {
        assert_eq!(
            HistoryScope::for_actor(&person(1, Role::SuperAdmin, None)).unwrap(),
            HistoryScope::All
        );
        assert_eq!(
            HistoryScope::for_actor(&person(1, Role::CampusAdmin, Some(3))).unwrap(),
            HistoryScope::Tenant(TenantId(3))
        );
        assert!(matches!(
            HistoryScope::for_actor(&person(1, Role::CampusAdmin, None)),
            Err(AuditError::IllegalState(_))
        ));
        for role in [Role::Student, Role::Guard, Role::Guest] {
            assert!(matches!(
                HistoryScope::for_actor(&person(1, role, Some(1))),
                Err(AuditError::Unauthorized { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_super_admin_default_window() {
        let (service, _) = seeded().await;
        let admin = person(1, Role::SuperAdmin, None);
        let views = service.query(&admin, None, None, None).await.unwrap();
        // The 8- and 40-day-old records fall outside the 7-day default.
        assert_eq!(views.len(), 3);
        assert!(views.windows(2).all(|w| w[0].time >= w[1].time));
    }

    #[tokio::test]
    async fn test_campus_admin_sees_own_tenant_only() {
        let (service, _) = seeded().await;
        let admin = person(2, Role::CampusAdmin, Some(1));
        let views = service.query(&admin, None, None, None).await.unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.tenant_name.as_deref() == Some("Tech")));
        assert!(views.iter().all(|v| v.identity_name == "p10"));
    }

    #[tokio::test]
    async fn test_limit_handling() {
        let (service, _) = seeded().await;
        let admin = person(1, Role::SuperAdmin, None);
        let views = service.query(&admin, None, None, Some(1)).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].time, ago(1_000));

        assert!(matches!(
            service.query(&admin, None, None, Some(0)).await,
            Err(AuditError::InvalidQuery(_))
        ));
        assert_eq!(
            service
                .query(&admin, None, None, Some(usize::MAX))
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_explicit_window() {
        let (service, _) = seeded().await;
        let admin = person(1, Role::SuperAdmin, None);
        let views = service
            .query(&admin, Some(ago(50 * DAY_MS)), Some(ago(5 * DAY_MS)), None)
            .await
            .unwrap();
        assert_eq!(views.len(), 2);

        assert!(matches!(
            service.query(&admin, Some(now()), Some(ago(1)), None).await,
            Err(AuditError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_student_refused_but_has_own_history() {
        let (service, _) = seeded().await;
        let student = person(10, Role::Student, Some(1));
        assert!(matches!(
            service.query(&student, None, None, None).await,
            Err(AuditError::Unauthorized { role: Role::Student })
        ));

        // 30-day personal window includes the 8-day-old record but not the 40-day one.
        let own = service.my_history(&student, None, None, None).await.unwrap();
        assert_eq!(own.len(), 3);
        assert!(own.iter().all(|v| v.credential_label == "c10"));
    }
}
