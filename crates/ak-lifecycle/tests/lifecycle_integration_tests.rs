//! Integration tests for the asset lifecycle.
//!
//! These tests drive [`LifecycleService`] against the in-memory inventory and
//! cover:
//! - The assign / unassign / status change scenarios
//! - Local rejection of illegal requests without any remote call
//! - Retired as a terminal status
//! - Server-side refusals surfacing with the server's message
//! - Stale snapshots losing a race against another writer
//!
//! # Running these tests
//!
//! ```bash
//! cargo test --package ak-lifecycle --test lifecycle_integration_tests
//! ```
//!
//! These tests use mock implementations and do not require external services.

use std::sync::Arc;

use ak_connectors::testing::{sample_asset, sample_asset_with_raw_status};
use ak_connectors::{ConnectorError, InventoryConnector, MockBehavior, MockInventoryConnector};
use ak_core::{valid_transitions, Asset, AssetStatus, HistoryFilter};
use ak_lifecycle::{LifecycleAction, LifecycleError, LifecycleService};

// ============================================================================
// Test Harness
// ============================================================================

struct Harness {
    inventory: Arc<MockInventoryConnector>,
    service: LifecycleService,
}

impl Harness {
    async fn with_assets(assets: Vec<Asset>) -> Self {
        let inventory = Arc::new(MockInventoryConnector::new("integration"));
        for asset in assets {
            inventory.put_asset(asset).await;
        }
        let service = LifecycleService::new(inventory.clone());
        Self { inventory, service }
    }

    async fn stored(&self, id: &str) -> Asset {
        self.inventory.get_asset(id).await.unwrap()
    }
}

fn assert_illegal(result: Result<Asset, LifecycleError>) {
    match result {
        Err(LifecycleError::IllegalTransition { .. }) => {}
        other => panic!("Expected IllegalTransition, got {:?}", other),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_assign_available_asset() {
    let asset = sample_asset("1", AssetStatus::Available);
    let h = Harness::with_assets(vec![asset.clone()]).await;

    let updated = h.service.assign(&asset, "alice@x.com").await.unwrap();

    assert!(updated.status.is(AssetStatus::Allocated));
    assert_eq!(updated.owner.as_deref(), Some("alice@x.com"));
    assert_eq!(h.stored("1").await, updated);
}

#[tokio::test]
async fn test_unassign_allocated_asset() {
    let asset = sample_asset("2", AssetStatus::Allocated).with_owner("alice@x.com");
    let h = Harness::with_assets(vec![asset.clone()]).await;

    let updated = h.service.unassign(&asset).await.unwrap();

    assert!(updated.status.is(AssetStatus::Available));
    assert!(updated.owner.is_none());
}

#[tokio::test]
async fn test_maintenance_to_repair_but_not_allocated() {
    let asset = sample_asset("3", AssetStatus::Maintenance);
    let h = Harness::with_assets(vec![asset.clone()]).await;

    assert_illegal(h.service.change_status(&asset, AssetStatus::Allocated).await);
    assert_eq!(h.inventory.mutation_count(), 0);

    let updated = h
        .service
        .change_status(&asset, AssetStatus::InRepair)
        .await
        .unwrap();
    assert!(updated.status.is(AssetStatus::InRepair));
    assert!(updated.owner.is_none());
}

#[tokio::test]
async fn test_legacy_alias_is_assignable() {
    let asset = sample_asset_with_raw_status("4", "unallocated");
    let h = Harness::with_assets(vec![asset.clone()]).await;

    assert_eq!(
        valid_transitions("unallocated"),
        vec![
            AssetStatus::Allocated,
            AssetStatus::Maintenance,
            AssetStatus::InRepair,
            AssetStatus::Retired,
        ]
    );

    let updated = h.service.assign(&asset, "bob@x.com").await.unwrap();
    assert!(updated.is_allocated());
}

#[tokio::test]
async fn test_assign_allocated_asset_is_rejected_locally() {
    let asset = sample_asset("5", AssetStatus::Allocated);
    let h = Harness::with_assets(vec![asset.clone()]).await;

    assert_illegal(h.service.assign(&asset, "bob@x.com").await);
    assert_eq!(h.inventory.mutation_count(), 0);
    assert_eq!(h.stored("5").await.owner.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn test_unassign_requires_allocation() {
    let statuses = [
        AssetStatus::Available,
        AssetStatus::Maintenance,
        AssetStatus::InRepair,
        AssetStatus::Retired,
    ];
    let assets: Vec<Asset> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| sample_asset(&format!("u{}", i), *s))
        .collect();
    let h = Harness::with_assets(assets.clone()).await;

    for asset in &assets {
        assert_illegal(h.service.unassign(asset).await);
    }
    assert_eq!(h.inventory.mutation_count(), 0);
}

#[tokio::test]
async fn test_retired_is_terminal() {
    let asset = sample_asset("6", AssetStatus::InRepair);
    let h = Harness::with_assets(vec![asset.clone()]).await;

    let retired = h
        .service
        .change_status(&asset, AssetStatus::Retired)
        .await
        .unwrap();
    assert!(h.service.available_actions(&retired).is_empty());

    let before = h.inventory.mutation_count();
    for target in AssetStatus::ALL {
        assert_illegal(h.service.change_status(&retired, target).await);
    }
    assert_illegal(h.service.assign(&retired, "bob@x.com").await);
    assert_illegal(h.service.unassign(&retired).await);
    assert_eq!(h.inventory.mutation_count(), before);
}

#[tokio::test]
async fn test_full_lifecycle_is_recorded() {
    let asset = sample_asset("7", AssetStatus::Available);
    let h = Harness::with_assets(vec![asset.clone()]).await;

    let asset = h.service.assign(&asset, "carol@x.com").await.unwrap();
    let asset = h.service.unassign(&asset).await.unwrap();
    let asset = h
        .service
        .change_status(&asset, AssetStatus::InRepair)
        .await
        .unwrap();
    let asset = h
        .service
        .change_status(&asset, AssetStatus::Available)
        .await
        .unwrap();
    assert_eq!(
        h.service.available_actions(&asset)[0],
        LifecycleAction::Assign
    );

    let history = h.inventory.recorded_history().await;
    assert_eq!(history.len(), 4);
    assert_eq!(
        history.iter().filter(|e| HistoryFilter::Assignments.matches(e)).count(),
        1
    );
    assert_eq!(
        history.iter().filter(|e| HistoryFilter::Unassignments.matches(e)).count(),
        1
    );
    assert_eq!(
        history.iter().filter(|e| HistoryFilter::Repairs.matches(e)).count(),
        1
    );
}

// ============================================================================
// Remote failures
// ============================================================================

#[tokio::test]
async fn test_stale_snapshot_loses_to_other_writer() {
    let snapshot = sample_asset("8", AssetStatus::Available);
    let h = Harness::with_assets(vec![snapshot.clone()]).await;

    // Another operator assigns the asset after our snapshot was taken.
    h.inventory
        .put_asset(snapshot.clone().with_status(AssetStatus::Allocated).with_owner("dave@x.com"))
        .await;

    let err = h.service.assign(&snapshot, "erin@x.com").await.unwrap_err();

    match &err {
        LifecycleError::RemoteFailure(ConnectorError::Rejected { status, message }) => {
            assert_eq!(*status, 409);
            assert_eq!(message, "Asset is not available for allocation");
        }
        other => panic!("Expected RemoteFailure, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Asset is not available for allocation");
    assert_eq!(h.stored("8").await.owner.as_deref(), Some("dave@x.com"));
    assert!(snapshot.status.is(AssetStatus::Available));
}

#[tokio::test]
async fn test_transport_failure_leaves_snapshot_untouched() {
    let asset = sample_asset("9", AssetStatus::Available);
    let h = Harness::with_assets(vec![asset.clone()]).await;
    h.inventory
        .set_behavior(MockBehavior::AlwaysFail(ConnectorError::ConnectionFailed(
            "connection refused".to_string(),
        )))
        .await;

    let err = h.service.assign(&asset, "frank@x.com").await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::RemoteFailure(ConnectorError::ConnectionFailed(_))
    ));
    assert!(asset.status.is(AssetStatus::Available));
    assert!(asset.owner.is_none());
    assert_eq!(h.inventory.mutation_count(), 1);
}

#[tokio::test]
async fn test_missing_asset_is_a_remote_failure() {
    let h = Harness::with_assets(Vec::new()).await;
    let ghost = sample_asset("404", AssetStatus::Maintenance);

    let err = h
        .service
        .change_status(&ghost, AssetStatus::Available)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::RemoteFailure(ConnectorError::NotFound(_))
    ));
}
