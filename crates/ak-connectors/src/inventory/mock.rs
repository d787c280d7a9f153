//! Mock inventory connector for testing.
//!
//! Holds the inventory in memory and applies the same effects the inventory
//! API does, including its own refusal to allocate an asset that is not
//! available. Every status change is appended to the status history.

use crate::traits::{
    ConnectorError, ConnectorHealth, ConnectorResult, InventoryConnector,
};
use ak_core::{
    Asset, AssetCategory, AssetEdit, AssetModel, AssetStatus, DirectoryUser, NewAsset,
    ReportedStatus, StatusChange,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Operator recorded in the history for changes made through the mock.
pub const MOCK_OPERATOR: &str = "mock-admin@example.com";

/// Mock behavior configuration.
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Normal operation.
    #[default]
    Normal,
    /// Fail after N calls.
    FailAfter { calls: u64, error: ConnectorError },
    /// Always fail.
    AlwaysFail(ConnectorError),
    /// Unhealthy status.
    Unhealthy(String),
}

/// Mock inventory connector for testing.
pub struct MockInventoryConnector {
    name: String,
    assets: Arc<RwLock<BTreeMap<String, Asset>>>,
    users: Arc<RwLock<Vec<DirectoryUser>>>,
    models: Arc<RwLock<Vec<AssetModel>>>,
    history: Arc<RwLock<Vec<StatusChange>>>,
    behavior: Arc<RwLock<MockBehavior>>,
    call_count: AtomicU64,
    mutation_count: AtomicU64,
    id_counter: AtomicU64,
}

impl MockInventoryConnector {
    /// Creates an empty mock inventory.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: Arc::new(RwLock::new(BTreeMap::new())),
            users: Arc::new(RwLock::new(Vec::new())),
            models: Arc::new(RwLock::new(Vec::new())),
            history: Arc::new(RwLock::new(Vec::new())),
            behavior: Arc::new(RwLock::new(MockBehavior::Normal)),
            call_count: AtomicU64::new(0),
            mutation_count: AtomicU64::new(0),
            id_counter: AtomicU64::new(1000),
        }
    }

    /// Creates a mock inventory holding a small sample office.
    pub fn with_sample_data(name: &str) -> Self {
        let assets = Self::generate_sample_assets()
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        Self {
            assets: Arc::new(RwLock::new(assets)),
            users: Arc::new(RwLock::new(Self::generate_sample_users())),
            models: Arc::new(RwLock::new(Self::generate_sample_models())),
            history: Arc::new(RwLock::new(Self::generate_sample_history())),
            ..Self::new(name)
        }
    }

    fn generate_sample_assets() -> Vec<Asset> {
        let mut laptop = Asset::new("1", "Laptop 001", AssetCategory::Laptop);
        laptop.model_name = "ThinkPad T14".to_string();
        laptop.manufacturer = "Lenovo".to_string();
        laptop.serial_number = Some("PF-2X91".to_string());

        let mut assigned = Asset::new("2", "Laptop 002", AssetCategory::Laptop)
            .with_status(AssetStatus::Allocated)
            .with_owner("alice@example.com");
        assigned.model_name = "MacBook Pro 14".to_string();
        assigned.manufacturer = "Apple".to_string();

        vec![
            laptop,
            assigned,
            Asset::new("3", "Monitor 001", AssetCategory::Monitor)
                .with_status(AssetStatus::Maintenance),
            Asset::new("4", "Keyboard 001", AssetCategory::Keyboard)
                .with_status(AssetStatus::InRepair),
            Asset::new("5", "Mouse 001", AssetCategory::Mouse).with_status(AssetStatus::Retired),
        ]
    }

    fn generate_sample_users() -> Vec<DirectoryUser> {
        vec![
            DirectoryUser {
                id: "u-1".to_string(),
                email: "alice@example.com".to_string(),
                name: Some("Alice Martin".to_string()),
            },
            DirectoryUser {
                id: "u-2".to_string(),
                email: "bob@example.com".to_string(),
                name: None,
            },
        ]
    }

    fn generate_sample_models() -> Vec<AssetModel> {
        vec![
            AssetModel {
                name: "ThinkPad T14".to_string(),
                model_number: "20W0".to_string(),
                manufacturer: "Lenovo".to_string(),
                category: AssetCategory::Laptop,
            },
            AssetModel {
                name: "U2720Q".to_string(),
                model_number: "U2720Q".to_string(),
                manufacturer: "Dell".to_string(),
                category: AssetCategory::Monitor,
            },
        ]
    }

    fn generate_sample_history() -> Vec<StatusChange> {
        let now = Utc::now();
        vec![
            StatusChange {
                id: "h-1".to_string(),
                asset_id: "2".to_string(),
                old_status: AssetStatus::Available.into(),
                new_status: AssetStatus::Allocated.into(),
                owned_by: Some("alice@example.com".to_string()),
                changed_by: MOCK_OPERATOR.to_string(),
                changed_at: now - Duration::days(3),
            },
            StatusChange {
                id: "h-2".to_string(),
                asset_id: "4".to_string(),
                old_status: AssetStatus::Available.into(),
                new_status: AssetStatus::InRepair.into(),
                owned_by: None,
                changed_by: MOCK_OPERATOR.to_string(),
                changed_at: now - Duration::days(1),
            },
        ]
    }

    /// Inserts or replaces an asset, bypassing all checks. Use it to seed
    /// records or to play the part of another writer.
    pub async fn put_asset(&self, asset: Asset) {
        let mut assets = self.assets.write().await;
        assets.insert(asset.id.clone(), asset);
    }

    /// Adds a directory user.
    pub async fn add_user(&self, user: DirectoryUser) {
        self.users.write().await.push(user);
    }

    /// Sets the behavior for failure injection.
    pub async fn set_behavior(&self, behavior: MockBehavior) {
        let mut b = self.behavior.write().await;
        *b = behavior;
    }

    /// Number of calls of any kind that reached the mock.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of mutating calls that reached the mock, failed or not.
    pub fn mutation_count(&self) -> u64 {
        self.mutation_count.load(Ordering::SeqCst)
    }

    /// Returns the recorded history in insertion order.
    pub async fn recorded_history(&self) -> Vec<StatusChange> {
        self.history.read().await.clone()
    }

    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Check behavior and apply any configured effects.
    async fn check_behavior(&self) -> ConnectorResult<()> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        let behavior = self.behavior.read().await;

        match &*behavior {
            MockBehavior::Normal | MockBehavior::Unhealthy(_) => Ok(()),
            MockBehavior::FailAfter { calls, error } => {
                if count > *calls {
                    Err(error.clone())
                } else {
                    Ok(())
                }
            }
            MockBehavior::AlwaysFail(error) => Err(error.clone()),
        }
    }

    async fn begin_mutation(&self) -> ConnectorResult<()> {
        self.mutation_count.fetch_add(1, Ordering::SeqCst);
        self.check_behavior().await
    }

    /// Applies a status change to a stored asset and records it.
    async fn apply_status(
        &self,
        asset_id: &str,
        check: impl FnOnce(&Asset) -> ConnectorResult<()>,
        status: AssetStatus,
        owner: Option<Option<String>>,
    ) -> ConnectorResult<Asset> {
        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(asset_id)
            .ok_or_else(|| ConnectorError::NotFound(format!("Asset {} not found", asset_id)))?;

        check(asset)?;

        let old_status = asset.status.clone();
        asset.status = ReportedStatus::Known(status);
        if let Some(owner) = owner {
            asset.owner = owner;
        }
        let updated = asset.clone();
        drop(assets);

        let entry = StatusChange {
            id: format!("h-{}", self.next_id()),
            asset_id: asset_id.to_string(),
            old_status,
            new_status: updated.status.clone(),
            owned_by: updated.owner.clone(),
            changed_by: MOCK_OPERATOR.to_string(),
            changed_at: Utc::now(),
        };
        self.history.write().await.push(entry);

        Ok(updated)
    }
}

fn conflict(message: impl Into<String>) -> ConnectorError {
    ConnectorError::Rejected {
        status: 409,
        message: message.into(),
    }
}

#[async_trait]
impl crate::traits::Connector for MockInventoryConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> &str {
        "inventory"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        let behavior = self.behavior.read().await;
        match &*behavior {
            MockBehavior::Unhealthy(reason) => Ok(ConnectorHealth::Unhealthy(reason.clone())),
            MockBehavior::AlwaysFail(_) => {
                Ok(ConnectorHealth::Unhealthy("Always failing".to_string()))
            }
            _ => Ok(ConnectorHealth::Healthy),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        let behavior = self.behavior.read().await;
        match &*behavior {
            MockBehavior::AlwaysFail(e) => Err(e.clone()),
            MockBehavior::Unhealthy(_) => Ok(false),
            _ => Ok(true),
        }
    }
}

#[async_trait]
impl InventoryConnector for MockInventoryConnector {
    async fn list_assets(&self) -> ConnectorResult<Vec<Asset>> {
        self.check_behavior().await?;
        Ok(self.assets.read().await.values().cloned().collect())
    }

    async fn get_asset(&self, asset_id: &str) -> ConnectorResult<Asset> {
        self.check_behavior().await?;
        self.assets
            .read()
            .await
            .get(asset_id)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("Asset {} not found", asset_id)))
    }

    async fn create_asset(&self, request: NewAsset) -> ConnectorResult<Asset> {
        self.begin_mutation().await?;

        if request.asset_name.trim().is_empty() {
            return Err(ConnectorError::Rejected {
                status: 400,
                message: "asset_name is required".to_string(),
            });
        }

        let id = self.next_id().to_string();
        let mut asset = Asset::new(id.clone(), request.asset_name, request.category);
        asset.model_name = request.model_name;
        asset.model_number = request.model_number;
        asset.manufacturer = request.manufacturer;
        asset.serial_number = Some(request.serial_number).filter(|s| !s.is_empty());
        asset.asset_tag = Some(request.asset_tag).filter(|s| !s.is_empty());

        self.assets.write().await.insert(id, asset.clone());
        Ok(asset)
    }

    async fn edit_asset(&self, asset_id: &str, edit: AssetEdit) -> ConnectorResult<Asset> {
        self.begin_mutation().await?;

        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(asset_id)
            .ok_or_else(|| ConnectorError::NotFound(format!("Asset {} not found", asset_id)))?;
        edit.apply_to(asset);
        Ok(asset.clone())
    }

    async fn allocate_asset(&self, asset_id: &str, owner: &str) -> ConnectorResult<Asset> {
        self.begin_mutation().await?;
        self.apply_status(
            asset_id,
            |asset| {
                if asset.status.is(AssetStatus::Available) {
                    Ok(())
                } else {
                    Err(conflict("Asset is not available for allocation"))
                }
            },
            AssetStatus::Allocated,
            Some(Some(owner.to_string())),
        )
        .await
    }

    async fn unallocate_asset(&self, asset_id: &str) -> ConnectorResult<Asset> {
        self.begin_mutation().await?;
        self.apply_status(
            asset_id,
            |asset| {
                if asset.is_allocated() {
                    Ok(())
                } else {
                    Err(conflict("Asset is not currently allocated"))
                }
            },
            AssetStatus::Available,
            Some(None),
        )
        .await
    }

    async fn update_asset_status(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> ConnectorResult<Asset> {
        self.begin_mutation().await?;
        self.apply_status(
            asset_id,
            |asset| {
                let legal = asset
                    .status
                    .known()
                    .is_some_and(|current| current.can_transition_to(status));
                if legal {
                    Ok(())
                } else {
                    Err(conflict(format!(
                        "Cannot change status from {} to {}",
                        asset.status.as_str(),
                        status.as_str()
                    )))
                }
            },
            status,
            None,
        )
        .await
    }

    async fn list_users(&self) -> ConnectorResult<Vec<DirectoryUser>> {
        self.check_behavior().await?;
        Ok(self.users.read().await.clone())
    }

    async fn list_asset_models(&self) -> ConnectorResult<Vec<AssetModel>> {
        self.check_behavior().await?;
        Ok(self.models.read().await.clone())
    }

    async fn status_history(&self) -> ConnectorResult<Vec<StatusChange>> {
        self.check_behavior().await?;
        Ok(self.history.read().await.clone())
    }
}
