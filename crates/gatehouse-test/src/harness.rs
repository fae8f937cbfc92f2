//! A gate engine wired to an in-memory store and a stopped clock.

use std::sync::Arc;

use gatehouse_core::{AuditRecord, Clock, Identity, SigningSecret};
use gatehouse_crypto::{CredentialCipher, DynamicToken};
use gatehouse_gate::{CredentialMode, GateEngine, GateResult, ScanRequest, Verdict};
use gatehouse_storage::{AuditQuery, AuditScope, GateStore, KvGateStore};

use crate::fixtures::{
    FAR_FUTURE_MILLIS, TEST_GATE, test_cipher, test_tenant_north, test_tenant_south, ts,
};
use crate::mocks::{FailingGateStore, FixedClock};

/// Engine plus the collaborators a test needs to poke at.
///
/// Both fixture campuses are seeded. Every call panics on setup failure.
#[derive(Debug)]
pub struct GateHarness {
    /// Backing store, with switchable failures.
    pub store: Arc<FailingGateStore<KvGateStore>>,
    /// The engine's clock.
    pub clock: Arc<FixedClock>,
    /// Credential cipher, when running in sealed mode.
    pub cipher: Option<CredentialCipher>,
    /// The engine under test.
    pub engine: GateEngine,
}

impl GateHarness {
    /// Plaintext credentials.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Sealed credentials under [`test_cipher`].
    pub async fn sealed() -> Self {
        Self::build(Some(test_cipher())).await
    }

    async fn build(cipher: Option<CredentialCipher>) -> Self {
        let store = Arc::new(FailingGateStore::new(
            KvGateStore::in_memory().expect("in-memory store"),
        ));
        for tenant in [test_tenant_north(), test_tenant_south()] {
            store.save_tenant(&tenant).await.expect("seed tenant");
        }

        let clock = Arc::new(FixedClock::default());
        let mode = cipher
            .clone()
            .map_or(CredentialMode::Plaintext, CredentialMode::Sealed);
        let engine = GateEngine::builder(store.clone())
            .clock(clock.clone())
            .credential_mode(mode)
            .build();

        Self {
            store,
            clock,
            cipher,
            engine,
        }
    }

    /// Store `identity` and return it as stored.
    ///
    /// In sealed mode the credential identifier is replaced by its sealed
    /// form, which is what the physical card then carries.
    pub async fn enroll(&self, mut identity: Identity) -> Identity {
        if let Some(cipher) = &self.cipher {
            identity.credential_id = cipher
                .encrypt(&identity.credential_id)
                .expect("seal credential");
        }
        self.store
            .save_identity(&identity)
            .await
            .expect("enroll identity");
        identity
    }

    /// Decide `credential` at the fixture gate.
    ///
    /// # Errors
    ///
    /// Propagates engine errors.
    pub async fn decide(&self, actor: &Identity, credential: &str) -> GateResult<Verdict> {
        self.engine
            .decide(actor, &ScanRequest::new(credential, TEST_GATE))
            .await
    }

    /// Scan `credential` at the fixture gate.
    pub async fn scan(&self, actor: &Identity, credential: &str) -> Verdict {
        self.engine
            .scan(actor, &ScanRequest::new(credential, TEST_GATE))
            .await
    }

    /// A dynamic QR token for `identity`, issued `offset_millis` from the
    /// clock's now.
    #[must_use]
    pub fn qr_for(&self, identity: &Identity, offset_millis: i64) -> String {
        let issued = self.clock.now().as_millis().saturating_add(offset_millis);
        let secret = identity.qr_secret.as_ref().map_or("", SigningSecret::expose);
        DynamicToken::issue(identity.id.0, issued, secret).to_string()
    }

    /// Every stored audit record, newest first.
    pub async fn all_records(&self) -> Vec<AuditRecord> {
        let query = AuditQuery::new(AuditScope::All, ts(0), ts(FAR_FUTURE_MILLIS), usize::MAX);
        self.store
            .inner()
            .query_audit_records(&query)
            .await
            .expect("query audit records")
    }
}
