//! The gate engine: resolve, decide, audit.

use std::sync::Arc;

use gatehouse_audit::{AuditLogger, HistoryConfig, HistoryQueryService};
use gatehouse_core::{Clock, DenialReason, Identity, ScanOutcome, SystemClock};
use gatehouse_crypto::DEFAULT_QR_WINDOW_MILLIS;
use gatehouse_storage::GateStore;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::decision;
use crate::error::GateResult;
use crate::resolver::{CredentialMode, CredentialResolver};
use crate::verdict::Verdict;

/// A scan presented at a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Raw scan string (static identifier or dynamic QR token).
    pub credential: String,
    /// Gate or device identifier.
    pub gate_id: String,
}

impl ScanRequest {
    /// Create a scan request.
    #[must_use]
    pub fn new(credential: impl Into<String>, gate_id: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            gate_id: gate_id.into(),
        }
    }
}

/// Stateless gate engine.
///
/// Share it behind an `Arc`; every call is independent and writes exactly one
/// audit record.
#[derive(Clone)]
pub struct GateEngine {
    resolver: CredentialResolver,
    audit: AuditLogger,
    history: HistoryQueryService,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for GateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateEngine")
            .field("resolver", &self.resolver)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl GateEngine {
    /// Start building an engine over `store`.
    #[must_use]
    pub fn builder(store: Arc<dyn GateStore>) -> GateEngineBuilder {
        GateEngineBuilder::new(store)
    }

    /// Decide a scan by `actor` and record it.
    ///
    /// Denials are `Ok` verdicts. A store failure during resolution is
    /// recorded as `DENIED / INVALID_TOKEN` and answered with a
    /// `"System Error"` verdict.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::AuditError`](crate::GateError::AuditError) if the
    /// audit record cannot be written. No verdict is returned in that case.
    pub async fn decide(&self, actor: &Identity, request: &ScanRequest) -> GateResult<Verdict> {
        let now = self.clock.now();
        let scan = request.credential.as_str();
        let gate_id = request.gate_id.as_str();
        let invalid = ScanOutcome::Denied(DenialReason::InvalidToken);

        if scan.trim().is_empty() {
            self.audit
                .record_at(invalid, gate_id, None, scan, now)
                .await?;
            info!(gate_id, actor = %actor.id, "Scan denied: empty token");
            return Ok(Verdict::empty_token());
        }

        let resolved = match self.resolver.resolve(scan, now).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(gate_id, actor = %actor.id, error = %e, "Credential resolution failed");
                self.audit
                    .record_at(invalid, gate_id, None, scan, now)
                    .await?;
                return Ok(Verdict::system_error());
            },
        };

        let identity = resolved.as_ref().map(|r| &r.identity);
        let label = resolved.as_ref().map_or(scan, |r| r.label(scan));
        let outcome = decision::evaluate(actor, identity, now);

        if let (ScanOutcome::Denied(DenialReason::WrongCampus), Some(identity)) =
            (outcome, identity)
        {
            warn!(
                gate_id,
                identity_id = %identity.id,
                identity_tenant = ?identity.tenant_id,
                actor_tenant = ?actor.tenant_id,
                "Cross-tenant access attempt"
            );
        }

        self.audit
            .record_at(outcome, gate_id, identity, label, now)
            .await?;

        let verdict = Verdict::for_outcome(outcome, identity);
        info!(
            gate_id,
            actor = %actor.id,
            status = %verdict.status,
            reason = ?verdict.reason,
            "Scan decided"
        );
        Ok(verdict)
    }

    /// Gate-facing entry point: like [`decide`](Self::decide) but never fails.
    ///
    /// Any internal error becomes a `DENIED` / `"System Error"` verdict.
    pub async fn scan(&self, actor: &Identity, request: &ScanRequest) -> Verdict {
        match self.decide(actor, request).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(gate_id = %request.gate_id, error = %e, "Scan failed");
                Verdict::system_error()
            },
        }
    }

    /// History queries over the same store and clock.
    #[must_use]
    pub fn history(&self) -> &HistoryQueryService {
        &self.history
    }

    /// The credential resolver.
    #[must_use]
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }
}

/// Builder for [`GateEngine`].
pub struct GateEngineBuilder {
    store: Arc<dyn GateStore>,
    mode: CredentialMode,
    clock: Arc<dyn Clock>,
    qr_window_millis: u64,
    history: HistoryConfig,
}

impl GateEngineBuilder {
    /// Plaintext credentials, system clock, default window and history limits.
    #[must_use]
    pub fn new(store: Arc<dyn GateStore>) -> Self {
        Self {
            store,
            mode: CredentialMode::Plaintext,
            clock: Arc::new(SystemClock),
            qr_window_millis: DEFAULT_QR_WINDOW_MILLIS,
            history: HistoryConfig::default(),
        }
    }

    /// Set how credential identifiers are held at rest.
    #[must_use]
    pub fn credential_mode(mut self, mode: CredentialMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the time source.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the dynamic QR freshness window.
    #[must_use]
    pub fn qr_window_millis(mut self, window: u64) -> Self {
        self.qr_window_millis = window;
        self
    }

    /// Set history windows and limits.
    #[must_use]
    pub fn history_config(mut self, config: HistoryConfig) -> Self {
        self.history = config;
        self
    }

    /// Build the engine.
    #[must_use]
    pub fn build(self) -> GateEngine {
        let resolver = CredentialResolver::new(Arc::clone(&self.store), self.mode)
            .with_qr_window_millis(self.qr_window_millis);
        let audit = AuditLogger::new(Arc::clone(&self.store), Arc::clone(&self.clock));
        let history =
            HistoryQueryService::with_config(self.store, Arc::clone(&self.clock), self.history);
        GateEngine {
            resolver,
            audit,
            history,
            clock: self.clock,
        }
    }
}
