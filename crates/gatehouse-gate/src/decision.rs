//! Authorization decision for a resolved scan.
//!
//! # Check Order
//!
//! 1. Blank scan -> `INVALID_TOKEN` (handled before resolution)
//! 2. No identity resolved -> `INVALID_TOKEN`
//! 3. Actor and identity both have a tenant and they differ -> `WRONG_CAMPUS`
//! 4. Identity inactive -> `SUSPENDED`
//! 5. `now > valid_until` -> `EXPIRED`
//! 6. Otherwise -> allowed
//!
//! The first failing check is the recorded reason.

use gatehouse_core::{DenialReason, Identity, ScanOutcome, Timestamp};

/// Decide the outcome of a scan by `actor` that resolved to `identity`.
#[must_use]
pub fn evaluate(actor: &Identity, identity: Option<&Identity>, now: Timestamp) -> ScanOutcome {
    let Some(identity) = identity else {
        return ScanOutcome::Denied(DenialReason::InvalidToken);
    };

    if let (Some(actor_tenant), Some(identity_tenant)) = (actor.tenant_id, identity.tenant_id)
        && actor_tenant != identity_tenant
    {
        return ScanOutcome::Denied(DenialReason::WrongCampus);
    }

    if !identity.active {
        return ScanOutcome::Denied(DenialReason::Suspended);
    }

    if identity.is_expired_at(now) {
        return ScanOutcome::Denied(DenialReason::Expired);
    }

    ScanOutcome::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{IdentityId, Role, TenantId};

    const NOW: i64 = 1_700_000_000_000;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    fn guard(tenant: Option<u64>) -> Identity {
        let g = Identity::new(IdentityId(100), "Gus", "grd", Role::Guard, at(NOW + 1));
        match tenant {
            Some(t) => g.with_tenant(TenantId(t)),
            None => g,
        }
    }

    fn student(tenant: Option<u64>, active: bool, valid_until: i64) -> Identity {
        let s = Identity::new(IdentityId(1), "Ada", "card", Role::Student, at(valid_until))
            .with_active(active);
        match tenant {
            Some(t) => s.with_tenant(TenantId(t)),
            None => s,
        }
    }

    #[test]
    fn test_unresolved_is_invalid_token() {
        assert_eq!(
            evaluate(&guard(Some(1)), None, at(NOW)),
            ScanOutcome::Denied(DenialReason::InvalidToken)
        );
    }

    #[test]
    fn test_allow() {
        let s = student(Some(1), true, NOW + 1);
        assert_eq!(evaluate(&guard(Some(1)), Some(&s), at(NOW)), ScanOutcome::Allowed);
    }

    #[test]
    fn test_expiry_boundary() {
        let s = student(Some(1), true, NOW);
        assert_eq!(evaluate(&guard(Some(1)), Some(&s), at(NOW)), ScanOutcome::Allowed);
        assert_eq!(
            evaluate(&guard(Some(1)), Some(&s), at(NOW + 1)),
            ScanOutcome::Denied(DenialReason::Expired)
        );
    }

    #[test]
    fn test_tenant_check() {
        let other = student(Some(2), true, NOW + 1);
        assert_eq!(
            evaluate(&guard(Some(1)), Some(&other), at(NOW)),
            ScanOutcome::Denied(DenialReason::WrongCampus)
        );
        // Actor without tenant is exempt.
        assert_eq!(evaluate(&guard(None), Some(&other), at(NOW)), ScanOutcome::Allowed);
        // Identity without tenant is exempt.
        let global = student(None, true, NOW + 1);
        assert_eq!(evaluate(&guard(Some(1)), Some(&global), at(NOW)), ScanOutcome::Allowed);
    }

    #[test]
    fn test_first_failing_check_wins() {
        // Wrong campus, suspended, and expired at once.
        let worst = student(Some(2), false, NOW - 1);
        assert_eq!(
            evaluate(&guard(Some(1)), Some(&worst), at(NOW)),
            ScanOutcome::Denied(DenialReason::WrongCampus)
        );
        // Suspended and expired.
        let lapsed = student(Some(1), false, NOW - 1);
        assert_eq!(
            evaluate(&guard(Some(1)), Some(&lapsed), at(NOW)),
            ScanOutcome::Denied(DenialReason::Suspended)
        );
    }
}
