//! Testing harness for connector implementations.
//!
//! Provides helper functions and utilities to simplify testing connectors
//! and the code built on them.

use crate::traits::{AuthConfig, ConnectorConfig, ConnectorHealth, ConnectorResult};
use ak_core::{Asset, AssetCategory, AssetStatus};
use std::collections::HashMap;

/// Creates a test connector config with sensible defaults.
pub fn test_connector_config(name: &str, base_url: &str) -> ConnectorConfig {
    ConnectorConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        auth: AuthConfig::None,
        timeout_secs: 30,
        max_retries: 0,
        verify_tls: true,
        headers: HashMap::new(),
    }
}

/// Creates a test connector config with API key auth.
pub fn test_connector_config_with_api_key(
    name: &str,
    base_url: &str,
    key: &str,
) -> ConnectorConfig {
    ConnectorConfig {
        auth: AuthConfig::ApiKey {
            key: crate::SecureString::from(key),
            header_name: "x-api-key".to_string(),
        },
        ..test_connector_config(name, base_url)
    }
}

/// Creates a sample asset in the given status. Allocated assets get an owner.
pub fn sample_asset(id: &str, status: AssetStatus) -> Asset {
    let asset = Asset::new(id, format!("Laptop {}", id), AssetCategory::Laptop).with_status(status);
    if status == AssetStatus::Allocated {
        asset.with_owner("alice@example.com")
    } else {
        asset
    }
}

/// Creates a sample asset carrying a status outside the registry.
pub fn sample_asset_with_raw_status(id: &str, status: &str) -> Asset {
    Asset::new(id, format!("Laptop {}", id), AssetCategory::Laptop).with_status(status)
}

/// Asserts that a connector health check returns healthy.
pub fn assert_healthy(result: &ConnectorResult<ConnectorHealth>) {
    match result {
        Ok(ConnectorHealth::Healthy) => {}
        other => panic!("Expected Healthy, got {:?}", other),
    }
}

/// Asserts that a connector health check returns unhealthy.
pub fn assert_unhealthy(result: &ConnectorResult<ConnectorHealth>) {
    match result {
        Ok(ConnectorHealth::Unhealthy(_)) => {}
        other => panic!("Expected Unhealthy, got {:?}", other),
    }
}
