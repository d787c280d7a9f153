//! Data models for inventory assets, directory users and status history.

pub mod asset;
pub mod history;
pub mod user;

pub use asset::{Asset, AssetCategory, AssetEdit, AssetModel, NewAsset};
pub use history::{filter_history, AssetActivity, HistoryFilter, StatusChange};
pub use user::{DirectoryUser, Role};
