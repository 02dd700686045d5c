use super::*;
use shared::error::{MutationError, MutationErrorCode};
use shared::money::money_eq;
use shared::visit::ApprovalStatus;

#[tokio::test]
async fn test_add_services_replaces_collection() {
    let (coordinator, persistence, _) = seeded_coordinator(VisitStatus::InProgress, &[]);

    coordinator
        .add_services(vec![
            input("svc-1", "Exterior wash", 100.0),
            input("svc-2", "Interior detail", 200.0),
        ])
        .await
        .unwrap();

    assert_eq!(coordinator.items().len(), 2);
    assert_eq!(persistence.add_calls.load(Ordering::SeqCst), 1);

    let totals = coordinator.totals();
    assert!(money_eq(totals.final_total.gross, 300.0));
    assert!(totals.final_total.is_consistent());
}

#[tokio::test]
async fn test_add_services_rejects_empty_set() {
    let (coordinator, persistence, _) = seeded_coordinator(VisitStatus::InProgress, &[]);

    let err = coordinator.add_services(vec![]).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(persistence.add_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_add_services_rejects_invalid_input_before_network() {
    let (coordinator, persistence, _) = seeded_coordinator(VisitStatus::InProgress, &[]);

    let err = coordinator
        .add_services(vec![input("svc-1", "Free wash", 0.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let mut over = input("svc-2", "Wax", 80.0);
    over.discount_value = Some(120.0); // percentage by default
    let err = coordinator.add_services(vec![over]).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(persistence.add_calls.load(Ordering::SeqCst), 0);
    assert!(coordinator.items().is_empty());
}

#[tokio::test]
async fn test_add_on_completed_visit_rejected_before_network() {
    let (coordinator, persistence, _) = seeded_coordinator(VisitStatus::Completed, &[]);

    let err = coordinator
        .add_services(vec![input("svc-1", "Wash", 50.0)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::NotPermitted {
            status: VisitStatus::Completed,
            ..
        }
    ));
    assert_eq!(persistence.add_calls.load(Ordering::SeqCst), 0);

    let classified: MutationError = err.into();
    assert_eq!(classified.code, MutationErrorCode::NotPermitted);
}

#[tokio::test]
async fn test_remove_service_replaces_collection() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0), ("svc-2", 60.0)]);

    coordinator
        .remove_service("svc-1", Some("customer declined".to_string()))
        .await
        .unwrap();

    assert_eq!(coordinator.items().len(), 1);
    assert_eq!(coordinator.items()[0].id, "svc-2");
    assert_eq!(persistence.remove_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_remove_missing_item_fails_locally() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    let err = coordinator.remove_service("svc-9", None).await.unwrap_err();
    assert!(matches!(err, EngineError::ItemNotFound(_)));
    assert_eq!(persistence.remove_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remove_on_cancelled_visit_rejected() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::Cancelled, &[("svc-1", 100.0)]);

    let err = coordinator.remove_service("svc-1", None).await.unwrap_err();
    assert!(matches!(err, EngineError::NotPermitted { .. }));
    assert_eq!(persistence.remove_calls.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.items().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_leaves_local_state_unchanged() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    persistence.fail_next_with(PersistenceError::Transport("connection reset".to_string()));
    let err = coordinator.remove_service("svc-1", None).await.unwrap_err();

    assert!(matches!(err, EngineError::Transport(_)));
    assert_eq!(coordinator.items().len(), 1, "no optimistic deletion");
}

#[tokio::test]
async fn test_conflict_classified_distinctly() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    persistence.fail_next_with(PersistenceError::Conflict(
        "service already removed by another actor".to_string(),
    ));
    let err = coordinator.remove_service("svc-1", None).await.unwrap_err();

    assert!(matches!(err, EngineError::Conflict(_)));
    let classified: MutationError = err.into();
    assert_eq!(classified.code, MutationErrorCode::Conflict);
    // Recovery is the same as transport: nothing merged, nothing removed
    assert_eq!(coordinator.items().len(), 1);
}

#[tokio::test]
async fn test_remove_reason_length_limited() {
    let (coordinator, persistence, _) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    let err = coordinator
        .remove_service("svc-1", Some("x".repeat(600)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(persistence.remove_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_apply_approval_through_external_channel() {
    let (coordinator, _, _) = seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    assert_eq!(
        coordinator.items()[0].approval_status,
        ApprovalStatus::Pending
    );
    assert!(coordinator.apply_approval("svc-1"));
    assert_eq!(
        coordinator.items()[0].approval_status,
        ApprovalStatus::Approved
    );
    assert!(!coordinator.apply_approval("missing"));
}

#[tokio::test]
async fn test_status_refresh_updates_gate_observation() {
    let (coordinator, _, status_source) =
        seeded_coordinator(VisitStatus::InProgress, &[("svc-1", 100.0)]);

    assert!(coordinator.begin_price_edit().is_err());

    status_source.set(VisitStatus::ReadyForPickup);
    let observed = coordinator.refresh_status().await.unwrap();
    assert_eq!(observed, VisitStatus::ReadyForPickup);
    assert!(coordinator.begin_price_edit().is_ok());
}
