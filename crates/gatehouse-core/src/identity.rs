//! Enrolled identities, tenants, and roles.
//!
//! Identities and tenants are owned by the storage collaborator. The engine
//! only reads them; it never mutates an identity during verification.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{IdentityId, TenantId, Timestamp};

/// Role of an enrolled identity.
///
/// A closed set: every policy decision matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Gate guard operating a scanner.
    Guard,
    /// Administrator of a single tenant.
    CampusAdmin,
    /// Global administrator with no tenant.
    SuperAdmin,
    /// Short-term visitor.
    Guest,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Student,
        Self::Guard,
        Self::CampusAdmin,
        Self::SuperAdmin,
        Self::Guest,
    ];

    /// Wire name of the role (e.g. `CAMPUS_ADMIN`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Guard => "GUARD",
            Self::CampusAdmin => "CAMPUS_ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Guest => "GUEST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError(pub String);

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for RoleParseError {}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

/// Per-identity seed used to sign dynamic QR payloads.
///
/// Never logged: `Debug` is redacted and the buffer is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wrap an existing secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Generate a fresh random secret (32 bytes, URL-safe base64).
    #[must_use]
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        let secret = URL_SAFE_NO_PAD.encode(seed);
        seed.zeroize();
        Self(secret)
    }

    /// The raw secret. Only signature code should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty (such a secret can never produce a valid signature).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}

/// A campus or organization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique tenant ID.
    pub id: TenantId,
    /// Display name (unique).
    pub name: String,
    /// Build/package identifier of the tenant's mobile app, if any.
    #[serde(default)]
    pub package_id: Option<String>,
}

impl Tenant {
    /// Create a tenant without a package identifier.
    #[must_use]
    pub fn new(id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            package_id: None,
        }
    }

    /// Set the package identifier.
    #[must_use]
    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }
}

/// A person enrolled in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique numeric ID.
    pub id: IdentityId,
    /// Display name.
    pub name: String,
    /// Contact address (email).
    #[serde(default)]
    pub email: Option<String>,
    /// Globally unique credential identifier, exactly as carried by the physical token.
    pub credential_id: String,
    /// Seed for dynamic QR signatures.
    #[serde(default)]
    pub qr_secret: Option<SigningSecret>,
    /// Role.
    pub role: Role,
    /// Whether the account is active. Inactive accounts are always denied.
    pub active: bool,
    /// The credential is denied strictly after this instant.
    pub valid_until: Timestamp,
    /// Owning tenant. `None` only for the global administrator.
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
}

impl Identity {
    /// Create an active identity with no tenant, contact, or QR secret.
    #[must_use]
    pub fn new(
        id: IdentityId,
        name: impl Into<String>,
        credential_id: impl Into<String>,
        role: Role,
        valid_until: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            credential_id: credential_id.into(),
            qr_secret: None,
            role,
            active: true,
            valid_until,
            tenant_id: None,
        }
    }

    /// Set the owning tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Set the contact address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the QR signing secret.
    #[must_use]
    pub fn with_qr_secret(mut self, secret: SigningSecret) -> Self {
        self.qr_secret = Some(secret);
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether the credential has expired at `now` (strictly after `valid_until`).
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new(
            IdentityId(1),
            "Ada",
            "card-1",
            Role::Student,
            Timestamp::from_millis(1_000_000).unwrap(),
        )
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::CampusAdmin).unwrap(),
            "\"CAMPUS_ADMIN\""
        );
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("campus-admin".parse::<Role>().unwrap(), Role::CampusAdmin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_expiry_is_strict() {
        let id = identity();
        let at = Timestamp::from_millis(1_000_000).unwrap();
        assert!(!id.is_expired_at(at));
        assert!(id.is_expired_at(Timestamp::from_millis(1_000_001).unwrap()));
    }

    #[test]
    fn test_secret_debug_redacted() {
        let id = identity().with_qr_secret(SigningSecret::new("super-secret-seed"));
        let debug = format!("{id:?}");
        assert!(!debug.contains("super-secret-seed"));
        assert!(debug.contains("SigningSecret(***)"));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = SigningSecret::generate();
        let b = SigningSecret::generate();
        assert_ne!(a, b);
        assert_eq!(a.expose().len(), 43);
    }

    #[test]
    fn test_identity_serde_defaults() {
        let json = r#"{
            "id": 5,
            "name": "Guard Gus",
            "credential_id": "grd-5",
            "role": "GUARD",
            "active": true,
            "valid_until": "2030-01-01T00:00:00Z"
        }"#;
        let id: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(id.id, IdentityId(5));
        assert!(id.tenant_id.is_none());
        assert!(id.qr_secret.is_none());
    }
}
