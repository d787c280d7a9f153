//! Lifecycle service.
//!
//! Entry point for every change to an asset's status or ownership. Each
//! operation checks the request against the transition table first and only
//! then calls the inventory system.

use crate::error::{LifecycleError, LifecycleResult};
use ak_connectors::InventoryConnector;
use ak_core::{Asset, AssetStatus};
use serde::Serialize;
use std::sync::Arc;

/// An operation currently permitted on an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "targets", rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Assign the asset to a user.
    Assign,
    /// Take the asset back from its owner.
    Unassign,
    /// Move the asset to one of these statuses.
    ChangeStatus(Vec<AssetStatus>),
}

/// Returns the operations permitted on `asset` in its current status.
///
/// Presentation layers offer exactly these; an asset with an unrecognized
/// status gets none.
pub fn available_actions(asset: &Asset) -> Vec<LifecycleAction> {
    let Some(current) = asset.status.known() else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    if current.can_transition_to(AssetStatus::Allocated) {
        actions.push(LifecycleAction::Assign);
    }
    if current == AssetStatus::Allocated {
        actions.push(LifecycleAction::Unassign);
    }
    let targets = current.generic_transitions();
    if !targets.is_empty() {
        actions.push(LifecycleAction::ChangeStatus(targets));
    }
    actions
}

/// Validates and performs asset lifecycle changes.
pub struct LifecycleService {
    inventory: Arc<dyn InventoryConnector>,
}

impl LifecycleService {
    /// Creates a service backed by the given inventory system.
    pub fn new(inventory: Arc<dyn InventoryConnector>) -> Self {
        Self { inventory }
    }

    /// Returns the inventory connector.
    pub fn inventory(&self) -> &Arc<dyn InventoryConnector> {
        &self.inventory
    }

    /// Assigns `asset` to `user_id`.
    ///
    /// Legal only while the asset is available. The returned record is
    /// allocated and owned by `user_id`.
    pub async fn assign(&self, asset: &Asset, user_id: &str) -> LifecycleResult<Asset> {
        let current = known_status(asset, AssetStatus::Allocated)?;
        if !current.can_transition_to(AssetStatus::Allocated) {
            return Err(illegal(asset, AssetStatus::Allocated));
        }

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(LifecycleError::InvalidAssignee {
                asset_id: asset.id.clone(),
            });
        }

        Ok(self.inventory.allocate_asset(&asset.id, user_id).await?)
    }

    /// Takes `asset` back from its owner.
    ///
    /// Legal only while the asset is allocated. The returned record is
    /// available with no owner.
    pub async fn unassign(&self, asset: &Asset) -> LifecycleResult<Asset> {
        let current = known_status(asset, AssetStatus::Available)?;
        if current != AssetStatus::Allocated {
            return Err(illegal(asset, AssetStatus::Available));
        }

        Ok(self.inventory.unallocate_asset(&asset.id).await?)
    }

    /// Moves `asset` to `new_status`, leaving its owner alone.
    ///
    /// Allocation is never reachable this way, and an allocated asset has to
    /// be unassigned first.
    pub async fn change_status(
        &self,
        asset: &Asset,
        new_status: AssetStatus,
    ) -> LifecycleResult<Asset> {
        let current = known_status(asset, new_status)?;
        if !current.generic_transitions().contains(&new_status) {
            return Err(illegal(asset, new_status));
        }

        Ok(self
            .inventory
            .update_asset_status(&asset.id, new_status)
            .await?)
    }

    /// Returns the operations permitted on `asset` right now.
    pub fn available_actions(&self, asset: &Asset) -> Vec<LifecycleAction> {
        available_actions(asset)
    }
}

fn known_status(asset: &Asset, to: AssetStatus) -> LifecycleResult<AssetStatus> {
    asset.status.known().ok_or_else(|| illegal(asset, to))
}

fn illegal(asset: &Asset, to: AssetStatus) -> LifecycleError {
    LifecycleError::IllegalTransition {
        asset_id: asset.id.clone(),
        from: asset.status.as_str().to_string(),
        to,
    }
}
