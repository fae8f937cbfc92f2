//! Credential resolution: scan string to identity.
//!
//! First match wins:
//!
//! 1. Static: the identity whose credential identifier equals the scan.
//! 2. Dynamic: only when the static path found nothing and the scan has
//!    exactly two `:`. The token must parse, name an existing identity, be
//!    fresh, and carry a valid signature under that identity's QR secret.
//!
//! Every rejection is silent (`Ok(None)`); only store failures are errors.

use std::sync::Arc;

use gatehouse_core::{DYNAMIC_QR_LABEL, Identity, IdentityId, SigningSecret, Timestamp};
use gatehouse_crypto::{CredentialCipher, DEFAULT_QR_WINDOW_MILLIS, DynamicToken};
use gatehouse_storage::GateStore;
use tracing::{debug, warn};

use crate::error::GateResult;

/// How credential identifiers are held at rest.
#[derive(Clone, Debug)]
pub enum CredentialMode {
    /// Identifiers are `CredentialCipher` output and cards carry the sealed
    /// string. Scans that do not authenticate under the key never reach the
    /// static lookup.
    Sealed(CredentialCipher),
    /// Identifiers are stored and matched as raw strings.
    Plaintext,
}

/// Which path resolved a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    /// Long-lived credential identifier.
    Static,
    /// Signed, time-limited QR token.
    Dynamic,
}

/// An identity found for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// The identity.
    pub identity: Identity,
    /// The path that matched.
    pub method: ResolutionMethod,
}

impl ResolvedIdentity {
    /// Audit label for this resolution: `"DYNAMIC-QR"` or the literal scan.
    #[must_use]
    pub fn label<'a>(&self, scan: &'a str) -> &'a str {
        match self.method {
            ResolutionMethod::Static => scan,
            ResolutionMethod::Dynamic => DYNAMIC_QR_LABEL,
        }
    }
}

/// Resolves scan strings against a [`GateStore`].
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn GateStore>,
    mode: CredentialMode,
    qr_window_millis: u64,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("mode", &self.mode)
            .field("qr_window_millis", &self.qr_window_millis)
            .finish_non_exhaustive()
    }
}

impl CredentialResolver {
    /// Create a resolver with the default 30 s QR window.
    #[must_use]
    pub fn new(store: Arc<dyn GateStore>, mode: CredentialMode) -> Self {
        Self {
            store,
            mode,
            qr_window_millis: DEFAULT_QR_WINDOW_MILLIS,
        }
    }

    /// Set the QR freshness window.
    #[must_use]
    pub fn with_qr_window_millis(mut self, window: u64) -> Self {
        self.qr_window_millis = window;
        self
    }

    /// The QR freshness window in milliseconds.
    #[must_use]
    pub fn qr_window_millis(&self) -> u64 {
        self.qr_window_millis
    }

    /// Resolve `scan` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::StorageError`](crate::GateError::StorageError) if a
    /// lookup fails. Unknown, forged, stale, or malformed scans are `Ok(None)`.
    pub async fn resolve(&self, scan: &str, now: Timestamp) -> GateResult<Option<ResolvedIdentity>> {
        if scan.trim().is_empty() {
            return Ok(None);
        }

        if let Some(identity) = self.resolve_static(scan).await? {
            debug!(identity_id = %identity.id, "Resolved static credential");
            return Ok(Some(ResolvedIdentity {
                identity,
                method: ResolutionMethod::Static,
            }));
        }

        if scan.matches(':').count() == 2 {
            return self.resolve_dynamic(scan, now).await;
        }

        debug!("Scan matched no credential");
        Ok(None)
    }

    async fn resolve_static(&self, scan: &str) -> GateResult<Option<Identity>> {
        if let CredentialMode::Sealed(cipher) = &self.mode
            && !cipher.is_authentic(scan)
        {
            return Ok(None);
        }
        Ok(self.store.identity_by_credential(scan).await?)
    }

    async fn resolve_dynamic(
        &self,
        scan: &str,
        now: Timestamp,
    ) -> GateResult<Option<ResolvedIdentity>> {
        let token = match DynamicToken::parse(scan) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "Scan is not a dynamic token");
                return Ok(None);
            },
        };

        let Some(identity) = self
            .store
            .identity_by_id(IdentityId(token.identity_id))
            .await?
        else {
            debug!(identity_id = token.identity_id, "Dynamic token names no identity");
            return Ok(None);
        };

        let now_millis = now.as_millis();
        if !token.is_fresh(now_millis, self.qr_window_millis) {
            warn!(
                identity_id = %identity.id,
                skew_ms = token.issued_at_millis.abs_diff(now_millis),
                "Dynamic QR outside freshness window"
            );
            return Ok(None);
        }

        let secret = identity
            .qr_secret
            .as_ref()
            .map_or("", SigningSecret::expose);
        if !token.verify(secret) {
            warn!(identity_id = %identity.id, "Invalid dynamic QR signature");
            return Ok(None);
        }

        Ok(Some(ResolvedIdentity {
            identity,
            method: ResolutionMethod::Dynamic,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{Role, TenantId};
    use gatehouse_storage::KvGateStore;

    const NOW: i64 = 1_700_000_000_000;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    fn person(id: u64, credential: &str) -> Identity {
        Identity::new(IdentityId(id), "Ada", credential, Role::Student, at(NOW + 1_000_000))
            .with_tenant(TenantId(1))
            .with_qr_secret(SigningSecret::new("seed"))
    }

    async fn plaintext_resolver(people: &[Identity]) -> CredentialResolver {
        let store = Arc::new(KvGateStore::in_memory().unwrap());
        for p in people {
            store.save_identity(p).await.unwrap();
        }
        CredentialResolver::new(store, CredentialMode::Plaintext)
    }

    #[tokio::test]
    async fn test_static_match_is_exact() {
        let resolver = plaintext_resolver(&[person(1, "card-1")]).await;
        let hit = resolver.resolve("card-1", at(NOW)).await.unwrap().unwrap();
        assert_eq!(hit.method, ResolutionMethod::Static);
        assert_eq!(hit.label("card-1"), "card-1");
        assert!(resolver.resolve("CARD-1", at(NOW)).await.unwrap().is_none());
        assert!(resolver.resolve("card-1 ", at(NOW)).await.unwrap().is_none());
        assert!(resolver.resolve("   ", at(NOW)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dynamic_match() {
        let resolver = plaintext_resolver(&[person(7, "card-7")]).await;
        let scan = DynamicToken::issue(7, NOW - 5_000, "seed").to_string();
        let hit = resolver.resolve(&scan, at(NOW)).await.unwrap().unwrap();
        assert_eq!(hit.method, ResolutionMethod::Dynamic);
        assert_eq!(hit.identity.id, IdentityId(7));
        assert_eq!(hit.label(&scan), DYNAMIC_QR_LABEL);
    }

    #[tokio::test]
    async fn test_dynamic_window_boundary() {
        let resolver = plaintext_resolver(&[person(7, "card-7")]).await;
        let exact = DynamicToken::issue(7, NOW - 30_000, "seed").to_string();
        assert!(resolver.resolve(&exact, at(NOW)).await.unwrap().is_some());
        let stale = DynamicToken::issue(7, NOW - 30_001, "seed").to_string();
        assert!(resolver.resolve(&stale, at(NOW)).await.unwrap().is_none());
        let future = DynamicToken::issue(7, NOW + 30_001, "seed").to_string();
        assert!(resolver.resolve(&future, at(NOW)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dynamic_rejections_are_silent() {
        let no_secret = Identity::new(IdentityId(8), "Bo", "card-8", Role::Student, at(NOW));
        let resolver = plaintext_resolver(&[person(7, "card-7"), no_secret]).await;
        let cases = [
            DynamicToken::issue(7, NOW, "wrong-seed").to_string(),
            DynamicToken::issue(99, NOW, "seed").to_string(),
            DynamicToken::issue(8, NOW, "").to_string(),
            DynamicToken::issue(8, NOW, "anything").to_string(),
            "7:not-a-number:sig".to_string(),
            "7:1:2:3".to_string(),
        ];
        for scan in cases {
            assert!(
                resolver.resolve(&scan, at(NOW)).await.unwrap().is_none(),
                "resolved {scan}"
            );
        }
    }

    #[tokio::test]
    async fn test_sealed_mode_requires_authentic_scan() {
        let cipher = CredentialCipher::generate();
        let sealed = cipher.encrypt("STU-0001").unwrap();
        let store = Arc::new(KvGateStore::in_memory().unwrap());
        store.save_identity(&person(1, &sealed)).await.unwrap();
        // A raw identifier that happens to be stored is not authentic.
        store.save_identity(&person(2, "raw-card")).await.unwrap();

        let resolver = CredentialResolver::new(store, CredentialMode::Sealed(cipher));
        assert!(resolver.resolve(&sealed, at(NOW)).await.unwrap().is_some());
        assert!(resolver.resolve("raw-card", at(NOW)).await.unwrap().is_none());

        let dynamic = DynamicToken::issue(2, NOW, "seed").to_string();
        let hit = resolver.resolve(&dynamic, at(NOW)).await.unwrap().unwrap();
        assert_eq!(hit.method, ResolutionMethod::Dynamic);
    }
}
