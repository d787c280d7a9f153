//! REST inventory connector.
//!
//! Talks to the inventory HTTP API. Records coming back from the API are
//! normalized on the way in: the legacy `unallocated` status becomes
//! `available`, the nested `asset_models` object is flattened onto the asset,
//! `current_owner` becomes `owner` and numeric ids become strings.

use crate::http::{HttpClient, RateLimitConfig};
use crate::traits::{
    ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult, InventoryConnector,
};
use ak_core::{
    Asset, AssetCategory, AssetEdit, AssetModel, AssetStatus, DirectoryUser, NewAsset,
    ReportedStatus, StatusChange,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

const INVENTORY_PATH: &str = "/dashboard/inventory";
const USERS_PATH: &str = "/dashboard/users";
const ASSET_MODELS_PATH: &str = "/dashboard/asset-models";
const STATUS_HISTORY_PATH: &str = "/dashboard/asset-status-history";

/// Configuration for the REST inventory connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestInventoryConfig {
    /// Base connector configuration.
    #[serde(flatten)]
    pub connector: ConnectorConfig,
    /// Client-side request budget, if any.
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
}

/// Inventory connector backed by the HTTP API.
pub struct RestInventoryConnector {
    config: RestInventoryConfig,
    client: HttpClient,
}

impl RestInventoryConnector {
    /// Creates a new REST inventory connector.
    pub fn new(config: RestInventoryConfig) -> ConnectorResult<Self> {
        let rate_limit = config.rate_limit_per_minute.map(RateLimitConfig::per_minute);
        let client = HttpClient::with_rate_limit(config.connector.clone(), rate_limit)?;

        info!(
            base_url = %config.connector.base_url,
            "Inventory connector initialized"
        );

        Ok(Self { config, client })
    }

    fn asset_path(action: &str, asset_id: &str) -> String {
        format!("/inventory/{}/{}", action, urlencoding::encode(asset_id))
    }

    /// Turns the reply of a mutating endpoint into an asset, re-reading the
    /// asset from the list endpoint when the reply carries no record.
    async fn settle(&self, reply: serde_json::Value, asset_id: &str) -> ConnectorResult<Asset> {
        match record_from_reply(reply) {
            Some(asset) if asset.id == asset_id => Ok(asset),
            Some(asset) => {
                warn!(
                    expected = %asset_id,
                    returned = %asset.id,
                    "Inventory API returned a different asset; re-reading"
                );
                self.get_asset(asset_id).await
            }
            None => {
                debug!(asset_id = %asset_id, "No record in reply; re-reading asset");
                self.get_asset(asset_id).await
            }
        }
    }
}

#[async_trait]
impl crate::traits::Connector for RestInventoryConnector {
    fn name(&self) -> &str {
        &self.config.connector.name
    }

    fn connector_type(&self) -> &str {
        "inventory"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        match self.client.get(INVENTORY_PATH).await {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(ConnectorError::AuthenticationFailed(_)) => Ok(ConnectorHealth::Unhealthy(
                "Authentication failed".to_string(),
            )),
            Err(ConnectorError::RateLimited(secs)) => Ok(ConnectorHealth::Degraded(format!(
                "Rate limited for {} seconds",
                secs
            ))),
            Err(ConnectorError::ConnectionFailed(e)) => Ok(ConnectorHealth::Unhealthy(format!(
                "Connection failed: {}",
                e
            ))),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        let response = self.client.get(INVENTORY_PATH).await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl InventoryConnector for RestInventoryConnector {
    #[instrument(skip(self))]
    async fn list_assets(&self) -> ConnectorResult<Vec<Asset>> {
        let envelope: DataEnvelope<RawAsset> = self.client.get_json(INVENTORY_PATH).await?;
        let assets: Vec<Asset> = envelope.data.into_iter().map(RawAsset::into_asset).collect();
        debug!(count = assets.len(), "Fetched inventory");
        Ok(assets)
    }

    #[instrument(skip(self, request), fields(serial = %request.serial_number))]
    async fn create_asset(&self, request: NewAsset) -> ConnectorResult<Asset> {
        let reply = self.client.post_json("/inventory/new", &request).await?;
        if let Some(asset) = record_from_reply(reply) {
            info!(asset_id = %asset.id, "Asset created");
            return Ok(asset);
        }

        let serial = request.serial_number.trim();
        let created = self
            .list_assets()
            .await?
            .into_iter()
            .find(|a| a.serial_number.as_deref().map(str::trim) == Some(serial))
            .ok_or_else(|| {
                ConnectorError::InvalidResponse(format!(
                    "Created asset with serial {} not found in inventory",
                    serial
                ))
            })?;
        info!(asset_id = %created.id, "Asset created");
        Ok(created)
    }

    #[instrument(skip(self, edit), fields(asset_id = %asset_id))]
    async fn edit_asset(&self, asset_id: &str, edit: AssetEdit) -> ConnectorResult<Asset> {
        if edit.is_empty() {
            return Err(ConnectorError::InvalidRequest(
                "Edit request has no fields set".to_string(),
            ));
        }
        let reply = self
            .client
            .put_json(&Self::asset_path("edit", asset_id), &edit)
            .await?;
        self.settle(reply, asset_id).await
    }

    #[instrument(skip(self), fields(asset_id = %asset_id))]
    async fn allocate_asset(&self, asset_id: &str, owner: &str) -> ConnectorResult<Asset> {
        let body = AllocateBody {
            current_owner: owner,
        };
        let reply = self
            .client
            .put_json(&Self::asset_path("allocate", asset_id), &body)
            .await?;
        info!(asset_id = %asset_id, owner = %owner, "Asset allocated");
        self.settle(reply, asset_id).await
    }

    #[instrument(skip(self), fields(asset_id = %asset_id))]
    async fn unallocate_asset(&self, asset_id: &str) -> ConnectorResult<Asset> {
        let reply = self
            .client
            .put_empty(&Self::asset_path("unallocate", asset_id))
            .await?;
        info!(asset_id = %asset_id, "Asset unallocated");
        self.settle(reply, asset_id).await
    }

    #[instrument(skip(self), fields(asset_id = %asset_id, status = %status.as_str()))]
    async fn update_asset_status(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> ConnectorResult<Asset> {
        let body = StatusBody {
            status: status.as_str(),
        };
        let path = format!("/inventory/update/status/{}", urlencoding::encode(asset_id));
        let reply = self.client.put_json(&path, &body).await?;
        info!(asset_id = %asset_id, status = %status.as_str(), "Asset status updated");
        self.settle(reply, asset_id).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> ConnectorResult<Vec<DirectoryUser>> {
        let envelope: DataEnvelope<RawUser> = self.client.get_json(USERS_PATH).await?;
        Ok(envelope.data.into_iter().map(RawUser::into_user).collect())
    }

    #[instrument(skip(self))]
    async fn list_asset_models(&self) -> ConnectorResult<Vec<AssetModel>> {
        let envelope: DataEnvelope<RawModel> = self.client.get_json(ASSET_MODELS_PATH).await?;
        Ok(envelope.data.into_iter().map(RawModel::into_model).collect())
    }

    #[instrument(skip(self))]
    async fn status_history(&self) -> ConnectorResult<Vec<StatusChange>> {
        let envelope: DataEnvelope<RawStatusChange> =
            self.client.get_json(STATUS_HISTORY_PATH).await?;
        Ok(envelope
            .data
            .into_iter()
            .filter_map(RawStatusChange::into_change)
            .collect())
    }
}

#[derive(Serialize)]
struct AllocateBody<'a> {
    current_owner: &'a str,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

/// `{ "data": [...] }` list envelope. A missing or null `data` is an empty list.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    data: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifier that may arrive as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Amount that may arrive as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn value(self) -> Option<f64> {
        match self {
            RawAmount::Number(n) => Some(n),
            RawAmount::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model_number: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl RawModel {
    fn into_model(self) -> AssetModel {
        AssetModel {
            name: self.name.unwrap_or_default(),
            model_number: self.model_number.unwrap_or_default(),
            manufacturer: self.manufacturer.unwrap_or_default(),
            category: category_or_other(self.category),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    id: RawId,
    #[serde(default)]
    asset_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    asset_models: Option<RawModel>,
    #[serde(default)]
    current_owner: Option<String>,
    #[serde(default)]
    serial_number: Option<String>,
    #[serde(default)]
    ant_tag: Option<String>,
    #[serde(default)]
    cost: Option<RawAmount>,
    #[serde(default)]
    purchase_date: Option<String>,
    #[serde(default)]
    warranty_expiry: Option<String>,
}

impl RawAsset {
    fn into_asset(self) -> Asset {
        let model = self.asset_models.unwrap_or_default();
        Asset {
            id: self.id.into_string(),
            name: self.asset_name.unwrap_or_default(),
            status: ReportedStatus::from(self.status.unwrap_or_default()),
            owner: non_empty(self.current_owner),
            category: category_or_other(model.category),
            model_name: model.name.unwrap_or_default(),
            model_number: model.model_number.unwrap_or_default(),
            manufacturer: model.manufacturer.unwrap_or_default(),
            serial_number: non_empty(self.serial_number),
            asset_tag: non_empty(self.ant_tag),
            cost: self.cost.and_then(RawAmount::value),
            purchase_date: self.purchase_date.as_deref().and_then(parse_date),
            warranty_expiry: self.warranty_expiry.as_deref().and_then(parse_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: RawId,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: Option<String>,
}

impl RawUser {
    fn into_user(self) -> DirectoryUser {
        DirectoryUser {
            id: self.id.into_string(),
            email: self.email,
            name: non_empty(self.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStatusChange {
    id: RawId,
    asset_id: RawId,
    #[serde(default)]
    old_status: Option<String>,
    #[serde(default)]
    new_status: Option<String>,
    #[serde(default)]
    owned_by: Option<String>,
    #[serde(default)]
    changed_by: Option<String>,
    changed_at: String,
}

impl RawStatusChange {
    fn into_change(self) -> Option<StatusChange> {
        let id = self.id.into_string();
        let Some(changed_at) = parse_timestamp(&self.changed_at) else {
            warn!(entry = %id, changed_at = %self.changed_at, "Skipping history entry with unreadable timestamp");
            return None;
        };
        Some(StatusChange {
            id,
            asset_id: self.asset_id.into_string(),
            old_status: ReportedStatus::from(self.old_status.unwrap_or_default()),
            new_status: ReportedStatus::from(self.new_status.unwrap_or_default()),
            owned_by: non_empty(self.owned_by),
            changed_by: self.changed_by.unwrap_or_default(),
            changed_at,
        })
    }
}

/// Pulls a complete asset record out of a mutating endpoint's reply: either
/// under `data` or at the top level, possibly wrapped in a one-element array.
///
/// Acknowledgements and bare table rows are not records: the reply must carry
/// a recognized `status` and the joined `asset_models` object, otherwise the
/// caller re-reads the asset.
fn record_from_reply(reply: serde_json::Value) -> Option<Asset> {
    let candidate = match reply {
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => serde_json::Value::Object(map),
        },
        other => other,
    };
    let candidate = match candidate {
        serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    if candidate.get("id").is_none() || !candidate.get("asset_models").is_some_and(|m| m.is_object())
    {
        return None;
    }
    let asset = serde_json::from_value::<RawAsset>(candidate)
        .ok()
        .map(RawAsset::into_asset)?;
    asset.status.known().map(|_| asset)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn category_or_other(value: Option<String>) -> AssetCategory {
    value.map(AssetCategory::from).unwrap_or_default()
}

/// Reads the date part of a date or timestamp string.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Reads an RFC 3339 timestamp, treating zone-less timestamps as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_connector_config;
    use serde_json::json;

    fn connector() -> RestInventoryConnector {
        RestInventoryConnector::new(RestInventoryConfig {
            connector: test_connector_config("inventory-test", "https://inventory.example.com/dev"),
            rate_limit_per_minute: Some(120),
        })
        .unwrap()
    }

    #[test]
    fn test_connector_identity() {
        use crate::traits::Connector;
        let connector = connector();
        assert_eq!(connector.name(), "inventory-test");
        assert_eq!(connector.connector_type(), "inventory");
    }

    #[test]
    fn test_asset_paths_are_encoded() {
        assert_eq!(
            RestInventoryConnector::asset_path("allocate", "42"),
            "/inventory/allocate/42"
        );
        assert_eq!(
            RestInventoryConnector::asset_path("edit", "a/b c"),
            "/inventory/edit/a%2Fb%20c"
        );
    }

    #[test]
    fn test_inventory_listing_is_normalized() {
        let body = json!({
            "data": [
                {
                    "id": 17,
                    "asset_name": "Laptop 17",
                    "status": "unallocated",
                    "asset_models": {
                        "name": "ThinkPad T14",
                        "model_number": "20W0",
                        "manufacturer": "Lenovo",
                        "category": "Laptop"
                    },
                    "current_owner": null,
                    "ant_tag": "TAG-17",
                    "cost": "84999.50",
                    "purchase_date": "2024-04-02T00:00:00.000Z"
                },
                {
                    "id": "18",
                    "asset_name": "Spare monitor",
                    "status": "allocated",
                    "current_owner": "bob@example.com"
                }
            ]
        });

        let envelope: DataEnvelope<RawAsset> = serde_json::from_value(body).unwrap();
        let assets: Vec<Asset> = envelope.data.into_iter().map(RawAsset::into_asset).collect();

        let laptop = &assets[0];
        assert_eq!(laptop.id, "17");
        assert_eq!(laptop.status, ReportedStatus::Known(AssetStatus::Available));
        assert_eq!(laptop.category, AssetCategory::Laptop);
        assert_eq!(laptop.model_name, "ThinkPad T14");
        assert_eq!(laptop.manufacturer, "Lenovo");
        assert_eq!(laptop.asset_tag.as_deref(), Some("TAG-17"));
        assert_eq!(laptop.cost, Some(84999.5));
        assert_eq!(laptop.purchase_date, NaiveDate::from_ymd_opt(2024, 4, 2));
        assert!(laptop.owner.is_none());

        let monitor = &assets[1];
        assert_eq!(monitor.id, "18");
        assert_eq!(monitor.category, AssetCategory::Other);
        assert_eq!(monitor.model_name, "");
        assert_eq!(monitor.owner.as_deref(), Some("bob@example.com"));
        assert!(monitor.is_allocated());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let raw: RawAsset =
            serde_json::from_value(json!({ "id": 3, "asset_name": "X", "status": "lost" }))
                .unwrap();
        let asset = raw.into_asset();
        assert_eq!(asset.status, ReportedStatus::Unrecognized("lost".to_string()));
    }

    #[test]
    fn test_missing_data_is_empty_list() {
        let envelope: DataEnvelope<RawUser> = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.data.is_empty());
        let envelope: DataEnvelope<RawUser> =
            serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn test_users_are_normalized() {
        let envelope: DataEnvelope<RawUser> = serde_json::from_value(json!({
            "data": [
                { "id": 1, "email": "alice@example.com", "name": "Alice" },
                { "id": "u-2", "email": "bob@example.com", "name": "" }
            ]
        }))
        .unwrap();
        let users: Vec<DirectoryUser> = envelope.data.into_iter().map(RawUser::into_user).collect();

        assert_eq!(users[0].id, "1");
        assert_eq!(users[0].display_name(), "Alice");
        assert!(users[1].name.is_none());
        assert_eq!(users[1].display_name(), "bob@example.com");
    }

    #[test]
    fn test_history_is_normalized() {
        let envelope: DataEnvelope<RawStatusChange> = serde_json::from_value(json!({
            "data": [
                {
                    "id": 1,
                    "asset_id": 17,
                    "old_status": "unallocated",
                    "new_status": "allocated",
                    "owned_by": "bob@example.com",
                    "changed_by": "admin@example.com",
                    "changed_at": "2025-03-01T09:15:00+05:30"
                },
                {
                    "id": 2,
                    "asset_id": 17,
                    "old_status": "allocated",
                    "new_status": "unallocated",
                    "changed_at": "2025-03-02 10:00:00"
                },
                {
                    "id": 3,
                    "asset_id": 17,
                    "old_status": "available",
                    "new_status": "in repair",
                    "changed_at": "yesterday"
                }
            ]
        }))
        .unwrap();
        let history: Vec<StatusChange> = envelope
            .data
            .into_iter()
            .filter_map(RawStatusChange::into_change)
            .collect();

        assert_eq!(history.len(), 2);
        assert!(history[0].is_assignment());
        assert_eq!(history[0].asset_id, "17");
        assert_eq!(
            history[0].changed_at,
            DateTime::parse_from_rfc3339("2025-03-01T03:45:00Z").unwrap()
        );
        assert!(history[1].is_unassignment());
        assert_eq!(history[1].changed_by, "");
    }

    #[test]
    fn test_record_from_reply_shapes() {
        let record = json!({
            "id": 5,
            "asset_name": "Dock",
            "status": "maintenance",
            "asset_models": { "name": "USB-C Dock", "category": "other" }
        });

        let wrapped = record_from_reply(json!({ "data": record.clone() })).unwrap();
        assert_eq!(wrapped.id, "5");
        assert!(wrapped.status.is(AssetStatus::Maintenance));
        assert_eq!(wrapped.model_name, "USB-C Dock");

        let listed = record_from_reply(json!({ "data": [record.clone()] })).unwrap();
        assert_eq!(listed.id, "5");

        let bare = record_from_reply(record).unwrap();
        assert_eq!(bare.name, "Dock");

        assert!(record_from_reply(json!({ "message": "Asset updated" })).is_none());
        assert!(record_from_reply(serde_json::Value::Null).is_none());
    }

    #[test]
    fn test_acknowledgement_is_not_a_record() {
        let ack = json!({ "id": 5, "message": "Asset allocated" });
        assert!(record_from_reply(ack).is_none());
    }

    #[test]
    fn test_row_without_model_join_is_not_a_record() {
        let row = json!({
            "data": [{ "id": 5, "status": "allocated", "current_owner": "a@x.com" }]
        });
        assert!(record_from_reply(row).is_none());
    }

    #[test]
    fn test_reply_with_unrecognized_status_is_not_a_record() {
        let reply = json!({
            "id": 5,
            "status": "",
            "asset_models": { "name": "Dock" }
        });
        assert!(record_from_reply(reply).is_none());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2023-11-30"), NaiveDate::from_ymd_opt(2023, 11, 30));
        assert_eq!(
            parse_date("2023-11-30T18:30:00.000Z"),
            NaiveDate::from_ymd_opt(2023, 11, 30)
        );
        assert_eq!(parse_date("30/11/2023"), None);
        assert_eq!(parse_date(""), None);
    }
}
