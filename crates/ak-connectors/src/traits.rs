//! Connector trait definitions for Asset Keeper.
//!
//! This module defines the interface to the remote inventory system, the
//! source of truth for every asset record, along with the configuration and
//! error types shared by all connector implementations.

use crate::secure_string::SecureString;
use ak_core::{
    Asset, AssetEdit, AssetModel, AssetStatus, DirectoryUser, NewAsset, StatusChange,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur in connectors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectorError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The remote system refused the request. `message` is the server's own
    /// explanation when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Health status of a connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorHealth {
    /// Connector is healthy and operational.
    Healthy,
    /// Connector is degraded but still functional.
    Degraded(String),
    /// Connector is unhealthy and not operational.
    Unhealthy(String),
    /// Health status is unknown.
    Unknown,
}

/// Configuration for a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Connector name/identifier.
    pub name: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum retries for server errors and transport failures.
    pub max_retries: u32,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
    /// Additional headers to include.
    pub headers: HashMap<String, String>,
}

/// Authentication configuration.
///
/// Credential fields use `SecureString` so they are zeroized from memory
/// when dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication.
    None,
    /// API key sent in a header.
    ApiKey {
        key: SecureString,
        header_name: String,
    },
    /// Bearer token issued by the identity provider.
    BearerToken { token: SecureString },
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector name.
    fn name(&self) -> &str;

    /// Returns the connector type (e.g., "inventory").
    fn connector_type(&self) -> &str;

    /// Checks the health of the connector.
    async fn health_check(&self) -> ConnectorResult<ConnectorHealth>;

    /// Tests the connection to the external system.
    async fn test_connection(&self) -> ConnectorResult<bool>;
}

/// The remote inventory system.
///
/// Every mutating call returns the record as the remote system holds it
/// after the change.
#[async_trait]
pub trait InventoryConnector: Connector {
    /// Lists every asset.
    async fn list_assets(&self) -> ConnectorResult<Vec<Asset>>;

    /// Gets a single asset by ID.
    async fn get_asset(&self, asset_id: &str) -> ConnectorResult<Asset> {
        self.list_assets()
            .await?
            .into_iter()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| ConnectorError::NotFound(format!("Asset {} not found", asset_id)))
    }

    /// Registers a new asset.
    async fn create_asset(&self, request: NewAsset) -> ConnectorResult<Asset>;

    /// Edits descriptive fields of an asset.
    async fn edit_asset(&self, asset_id: &str, edit: AssetEdit) -> ConnectorResult<Asset>;

    /// Assigns an asset to a user: status becomes allocated, owner is set.
    async fn allocate_asset(&self, asset_id: &str, owner: &str) -> ConnectorResult<Asset>;

    /// Unassigns an asset: status becomes available, owner is cleared.
    async fn unallocate_asset(&self, asset_id: &str) -> ConnectorResult<Asset>;

    /// Sets an asset's status without touching its owner.
    async fn update_asset_status(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> ConnectorResult<Asset>;

    /// Lists users assets can be assigned to.
    async fn list_users(&self) -> ConnectorResult<Vec<DirectoryUser>>;

    /// Lists the hardware model catalogue.
    async fn list_asset_models(&self) -> ConnectorResult<Vec<AssetModel>>;

    /// Returns the status change audit trail.
    async fn status_history(&self) -> ConnectorResult<Vec<StatusChange>>;
}
