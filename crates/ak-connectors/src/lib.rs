//! # ak-connectors
//!
//! Access to the remote inventory system that owns every asset record.
//!
//! This crate provides the [`InventoryConnector`] trait, an HTTP
//! implementation for the inventory REST API and an in-memory mock used by
//! tests and offline runs.

pub mod http;
pub mod inventory;
pub mod secure_string;
pub mod testing;
pub mod traits;

pub use secure_string::SecureString;
pub use traits::{
    AuthConfig, Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    InventoryConnector,
};

pub use inventory::{
    MockBehavior, MockInventoryConnector, RestInventoryConfig, RestInventoryConnector,
};
