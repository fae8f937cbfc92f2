//! History visibility, windows, and limits over records written by real scans.

#![allow(clippy::arithmetic_side_effects)]

use gatehouse_audit::AuditError;
use gatehouse_core::{AccessStatus, DenialReason, IdentityId, Role};
use gatehouse_storage::GateStore;
use gatehouse_test::{
    DAY_MILLIS, GateHarness, NORTH, SOUTH, days_from_now, test_campus_admin, test_guard,
    test_student, test_super_admin,
};

/// Two allowed scans on each campus and one unknown scan.
async fn seeded() -> GateHarness {
    let harness = GateHarness::new().await;
    let north_guard = test_guard(20, NORTH);
    let south_guard = test_guard(21, SOUTH);
    for (id, tenant, guard) in [
        (10, NORTH, &north_guard),
        (11, NORTH, &north_guard),
        (12, SOUTH, &south_guard),
        (13, SOUTH, &south_guard),
    ] {
        let student = harness.enroll(test_student(id, tenant)).await;
        harness.scan(guard, &student.credential_id).await;
        harness.clock.advance_millis(1_000);
    }
    harness.scan(&north_guard, "lost-card").await;
    harness
}

#[tokio::test]
async fn test_super_admin_sees_everything() {
    let harness = seeded().await;
    let views = harness
        .engine
        .history()
        .query(&test_super_admin(), None, None, None)
        .await
        .unwrap();
    assert_eq!(views.len(), 5);
    assert_eq!(views[0].identity_name, "Unknown");
    assert_eq!(views[0].tenant_name, None);
    assert_eq!(views[1].identity_name, "Student 13");
    assert!(views.windows(2).all(|w| w[0].time >= w[1].time));
}

#[tokio::test]
async fn test_campus_admin_sees_own_campus_only() {
    let harness = seeded().await;
    let history = harness.engine.history();

    let north = history
        .query(&test_campus_admin(30, NORTH), None, None, None)
        .await
        .unwrap();
    let names: Vec<_> = north.iter().map(|v| v.identity_name.as_str()).collect();
    assert_eq!(names, ["Student 11", "Student 10"]);
    assert!(north.iter().all(|v| v.tenant_name.as_deref() == Some("North Campus")));

    let south = history
        .query(&test_campus_admin(31, SOUTH), None, None, None)
        .await
        .unwrap();
    assert_eq!(south.len(), 2);
    assert!(south.iter().all(|v| v.tenant_name.as_deref() == Some("South Campus")));
}

#[tokio::test]
async fn test_non_admins_are_refused() {
    let harness = seeded().await;
    let history = harness.engine.history();

    for actor in [test_student(10, NORTH), test_guard(20, NORTH)] {
        let err = history.query(&actor, None, None, None).await.unwrap_err();
        assert!(
            matches!(err, AuditError::Unauthorized { role } if role == actor.role),
            "{err}"
        );
    }
    let mut guest = test_student(40, NORTH);
    guest.role = Role::Guest;
    assert!(matches!(
        history.query(&guest, None, None, None).await,
        Err(AuditError::Unauthorized { role: Role::Guest })
    ));
}

#[tokio::test]
async fn test_campus_admin_without_tenant_is_illegal_state() {
    let harness = seeded().await;
    let mut admin = test_campus_admin(30, NORTH);
    admin.tenant_id = None;
    let err = harness
        .engine
        .history()
        .query(&admin, None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::IllegalState(_)));
}

#[tokio::test]
async fn test_own_history_is_open_to_every_role() {
    let harness = seeded().await;
    let student = test_student(10, NORTH);
    let guard = test_guard(20, NORTH);
    let other = harness.enroll(test_student(14, NORTH)).await;
    harness.scan(&guard, &other.credential_id).await;
    harness.scan(&guard, &student.credential_id).await;

    let mine = harness
        .engine
        .history()
        .my_history(&student, None, None, None)
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|v| v.identity_name == "Student 10"));
    assert!(mine.iter().all(|v| v.status == AccessStatus::Allowed));

    // The guard never scanned their own card.
    let none = harness
        .engine
        .history()
        .my_history(&guard, None, None, None)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_default_windows() {
    let harness = GateHarness::new().await;
    let guard = test_guard(20, NORTH);
    let mut student = test_student(10, NORTH);
    student.valid_until = days_from_now(3650);
    let student = harness.enroll(student).await;

    // Scans 20 and 10 days before the final clock position, then one now.
    harness.scan(&guard, &student.credential_id).await;
    harness.clock.advance_millis(10 * DAY_MILLIS);
    harness.scan(&guard, &student.credential_id).await;
    harness.clock.advance_millis(10 * DAY_MILLIS);
    harness.scan(&guard, &student.credential_id).await;

    let history = harness.engine.history();
    let gate_wide = history
        .query(&test_super_admin(), None, None, None)
        .await
        .unwrap();
    assert_eq!(gate_wide.len(), 1);

    let personal = history.my_history(&student, None, None, None).await.unwrap();
    assert_eq!(personal.len(), 3);

    let explicit = history
        .query(&test_super_admin(), Some(days_from_now(-1)), None, None)
        .await
        .unwrap();
    assert_eq!(explicit.len(), 3);
}

#[tokio::test]
async fn test_limits() {
    let harness = seeded().await;
    let history = harness.engine.history();
    let root = test_super_admin();

    let err = history.query(&root, None, None, Some(0)).await.unwrap_err();
    assert!(matches!(err, AuditError::InvalidQuery(_)));
    let err = history
        .my_history(&test_student(10, NORTH), None, None, Some(0))
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::InvalidQuery(_)));

    assert_eq!(history.query(&root, None, None, Some(2)).await.unwrap().len(), 2);
    assert_eq!(
        history
            .query(&root, None, None, Some(usize::MAX))
            .await
            .unwrap()
            .len(),
        5
    );
}

#[tokio::test]
async fn test_inverted_window_is_rejected() {
    let harness = seeded().await;
    let err = harness
        .engine
        .history()
        .query(
            &test_super_admin(),
            Some(days_from_now(1)),
            Some(days_from_now(0)),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_history_outlives_the_identity() {
    let harness = seeded().await;
    assert!(harness.store.delete_identity(IdentityId(10)).await.unwrap());

    let views = harness
        .engine
        .history()
        .query(&test_campus_admin(30, NORTH), None, None, None)
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[1].identity_name, "Student 10");
    assert_eq!(views[1].tenant_name.as_deref(), Some("North Campus"));
}

#[tokio::test]
async fn test_view_json_for_a_denial() {
    let harness = GateHarness::new().await;
    let student = harness.enroll(test_student(12, SOUTH)).await;
    harness.scan(&test_guard(20, NORTH), &student.credential_id).await;

    let views = harness
        .engine
        .history()
        .query(&test_campus_admin(31, SOUTH), None, None, None)
        .await
        .unwrap();
    assert_eq!(views[0].reason, Some(DenialReason::WrongCampus));

    let json = serde_json::to_value(&views[0]).unwrap();
    assert_eq!(json["status"], "DENIED");
    assert_eq!(json["reason"], "WRONG_CAMPUS");
    assert_eq!(json["credentialLabel"], "STU-12");
    assert_eq!(json["gateId"], "north-main");
    assert_eq!(json["tenantName"], "South Campus");
}
