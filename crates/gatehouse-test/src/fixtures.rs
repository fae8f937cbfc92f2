//! Test fixtures: two campuses and a cast of identities on them.

use gatehouse_core::{Identity, IdentityId, Role, SigningSecret, Tenant, TenantId, Timestamp};
use gatehouse_crypto::CredentialCipher;

/// Fixed "now" used by fixtures and [`FixedClock::default`](crate::FixedClock).
pub const TEST_NOW_MILLIS: i64 = 1_767_225_600_000;

/// 2100-01-01, an upper bound for "all records" queries.
pub const FAR_FUTURE_MILLIS: i64 = 4_102_444_800_000;

/// One day in milliseconds.
pub const DAY_MILLIS: i64 = 86_400_000;

/// North campus ID.
pub const NORTH: TenantId = TenantId(1);

/// South campus ID.
pub const SOUTH: TenantId = TenantId(2);

/// Gate ID used by fixtures.
pub const TEST_GATE: &str = "north-main";

/// Build a timestamp from epoch millis. Panics on out-of-range input.
#[must_use]
pub fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap_or_else(|| panic!("timestamp out of range: {millis}"))
}

/// [`TEST_NOW_MILLIS`] as a timestamp.
#[must_use]
pub fn test_now() -> Timestamp {
    ts(TEST_NOW_MILLIS)
}

/// A timestamp `days` after [`test_now`] (negative for the past).
#[must_use]
pub fn days_from_now(days: i64) -> Timestamp {
    ts(TEST_NOW_MILLIS.saturating_add(days.saturating_mul(DAY_MILLIS)))
}

/// North campus.
#[must_use]
pub fn test_tenant_north() -> Tenant {
    Tenant::new(NORTH, "North Campus").with_package_id("edu.north.gate")
}

/// South campus.
#[must_use]
pub fn test_tenant_south() -> Tenant {
    Tenant::new(SOUTH, "South Campus").with_package_id("edu.south.gate")
}

/// Deterministic per-identity QR secret.
#[must_use]
pub fn test_qr_secret(id: u64) -> SigningSecret {
    SigningSecret::new(format!("qr-seed-{id}"))
}

/// An active student on `tenant` whose credential is valid for a year.
///
/// The credential identifier is `STU-{id}`.
#[must_use]
pub fn test_student(id: u64, tenant: TenantId) -> Identity {
    Identity::new(
        IdentityId(id),
        format!("Student {id}"),
        format!("STU-{id}"),
        Role::Student,
        days_from_now(365),
    )
    .with_tenant(tenant)
    .with_email(format!("student{id}@campus.test"))
    .with_qr_secret(test_qr_secret(id))
}

/// A guard on `tenant`.
#[must_use]
pub fn test_guard(id: u64, tenant: TenantId) -> Identity {
    Identity::new(
        IdentityId(id),
        format!("Guard {id}"),
        format!("GRD-{id}"),
        Role::Guard,
        days_from_now(365),
    )
    .with_tenant(tenant)
}

/// A campus administrator on `tenant`.
#[must_use]
pub fn test_campus_admin(id: u64, tenant: TenantId) -> Identity {
    Identity::new(
        IdentityId(id),
        format!("Admin {id}"),
        format!("ADM-{id}"),
        Role::CampusAdmin,
        days_from_now(365),
    )
    .with_tenant(tenant)
}

/// The global administrator. Has no tenant.
#[must_use]
pub fn test_super_admin() -> Identity {
    Identity::new(
        IdentityId(1),
        "Root",
        "ROOT-1",
        Role::SuperAdmin,
        days_from_now(3650),
    )
}

/// Cipher over a fixed key.
#[must_use]
pub fn test_cipher() -> CredentialCipher {
    CredentialCipher::from_key([0x5a; 32])
}
