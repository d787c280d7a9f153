//! Asset data model.
//!
//! Assets are inventory items (laptops, monitors, peripherals) owned by the
//! remote inventory system. Instances held here are snapshots of the remote
//! record.

use crate::status::{AssetStatus, ReportedStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tracked inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Opaque identifier assigned by the inventory system.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Current lifecycle status.
    pub status: ReportedStatus,
    /// Identifier (e-mail) of the user holding the asset, if allocated.
    pub owner: Option<String>,
    /// Hardware category.
    pub category: AssetCategory,
    /// Model name.
    #[serde(default)]
    pub model_name: String,
    /// Manufacturer model number.
    #[serde(default)]
    pub model_number: String,
    /// Manufacturer.
    #[serde(default)]
    pub manufacturer: String,
    /// Serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Inventory tag stuck on the device.
    #[serde(default)]
    pub asset_tag: Option<String>,
    /// Purchase cost.
    #[serde(default)]
    pub cost: Option<f64>,
    /// Purchase date.
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    /// End of warranty.
    #[serde(default)]
    pub warranty_expiry: Option<NaiveDate>,
}

impl Asset {
    /// Creates a new asset in its initial state: available, unowned.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: AssetCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ReportedStatus::Known(AssetStatus::Available),
            owner: None,
            category,
            model_name: String::new(),
            model_number: String::new(),
            manufacturer: String::new(),
            serial_number: None,
            asset_tag: None,
            cost: None,
            purchase_date: None,
            warranty_expiry: None,
        }
    }

    /// Returns a copy with the given status.
    pub fn with_status(mut self, status: impl Into<ReportedStatus>) -> Self {
        self.status = status.into();
        self
    }

    /// Returns a copy with the given owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Returns true if the asset is currently allocated to someone.
    pub fn is_allocated(&self) -> bool {
        self.status.is(AssetStatus::Allocated)
    }

    /// Returns true if `email` holds the asset (case-insensitive).
    pub fn is_owned_by(&self, email: &str) -> bool {
        let email = email.trim();
        !email.is_empty()
            && self
                .owner
                .as_deref()
                .is_some_and(|owner| owner.trim().eq_ignore_ascii_case(email))
    }

    /// Checks the category against a case-insensitive filter.
    pub fn matches_category(&self, category: &str) -> bool {
        self.category.as_str().eq_ignore_ascii_case(category.trim())
    }
}

/// Hardware category of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetCategory {
    Laptop,
    Monitor,
    Keyboard,
    Mouse,
    /// Fallback for records without a category.
    #[default]
    Other,
    /// Any other category, lower-cased.
    Custom(String),
}

impl AssetCategory {
    /// Returns the lower-case wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            AssetCategory::Laptop => "laptop",
            AssetCategory::Monitor => "monitor",
            AssetCategory::Keyboard => "keyboard",
            AssetCategory::Mouse => "mouse",
            AssetCategory::Other => "other",
            AssetCategory::Custom(name) => name,
        }
    }
}

impl From<String> for AssetCategory {
    fn from(value: String) -> Self {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "laptop" => AssetCategory::Laptop,
            "monitor" => AssetCategory::Monitor,
            "keyboard" => AssetCategory::Keyboard,
            "mouse" => AssetCategory::Mouse,
            "" | "other" => AssetCategory::Other,
            _ => AssetCategory::Custom(value),
        }
    }
}

impl From<&str> for AssetCategory {
    fn from(value: &str) -> Self {
        AssetCategory::from(value.to_string())
    }
}

impl From<AssetCategory> for String {
    fn from(category: AssetCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetCategory::Laptop => write!(f, "Laptop"),
            AssetCategory::Monitor => write!(f, "Monitor"),
            AssetCategory::Keyboard => write!(f, "Keyboard"),
            AssetCategory::Mouse => write!(f, "Mouse"),
            AssetCategory::Other => write!(f, "Other"),
            AssetCategory::Custom(name) => write!(f, "Custom: {}", name),
        }
    }
}

/// Hardware model from the inventory catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: AssetCategory,
}

/// Request to register a new asset. New assets always start out available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub asset_name: String,
    pub model_name: String,
    pub model_number: String,
    pub manufacturer: String,
    pub serial_number: String,
    /// Inventory tag. The remote API spells this field `ant_tag`.
    #[serde(rename = "ant_tag")]
    pub asset_tag: String,
    pub category: AssetCategory,
}

/// Partial update of an asset's descriptive fields. Status and ownership are
/// never edited through this request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<NaiveDate>,
}

impl AssetEdit {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.asset_name.is_none()
            && self.serial_number.is_none()
            && self.cost.is_none()
            && self.purchase_date.is_none()
            && self.warranty_expiry.is_none()
    }

    /// Applies the edit to a local copy of an asset.
    pub fn apply_to(&self, asset: &mut Asset) {
        if let Some(name) = &self.asset_name {
            asset.name = name.clone();
        }
        if let Some(serial) = &self.serial_number {
            asset.serial_number = Some(serial.clone());
        }
        if let Some(cost) = self.cost {
            asset.cost = Some(cost);
        }
        if let Some(date) = self.purchase_date {
            asset.purchase_date = Some(date);
        }
        if let Some(date) = self.warranty_expiry {
            asset.warranty_expiry = Some(date);
        }
    }
}
