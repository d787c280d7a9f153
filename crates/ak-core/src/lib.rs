//! # ak-core
//!
//! Domain model for Asset Keeper.
//!
//! This crate provides the asset status registry, the status transition
//! policy, the asset / user / history data models, and the dashboard
//! aggregations built on top of them. Everything here is pure; talking to the
//! inventory API is the job of `ak-connectors`.

pub mod dashboard;
pub mod models;
pub mod status;
pub mod transitions;

pub use dashboard::{CategoryCounts, OwnershipFilter, StatusCounts};
pub use models::{
    filter_history, Asset, AssetActivity, AssetCategory, AssetEdit, AssetModel, DirectoryUser,
    HistoryFilter, NewAsset, Role, StatusChange,
};
pub use status::{is_valid_status, AssetStatus, ReportedStatus, LEGACY_AVAILABLE_ALIAS};
pub use transitions::valid_transitions;
