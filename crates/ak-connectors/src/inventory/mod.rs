//! Inventory system connectors.

pub mod mock;
pub mod rest;

pub use mock::{MockBehavior, MockInventoryConnector};
pub use rest::{RestInventoryConfig, RestInventoryConnector};
