//! Asset status registry.
//!
//! Defines the closed set of lifecycle statuses an asset can occupy and the
//! normalization applied to status strings reported by the inventory API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legacy spelling of [`AssetStatus::Available`] still emitted by the
/// inventory API and its status history.
pub const LEGACY_AVAILABLE_ALIAS: &str = "unallocated";

/// Lifecycle status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetStatus {
    /// In stock and free to be assigned.
    #[serde(rename = "available", alias = "unallocated")]
    Available,
    /// Assigned to a user.
    #[serde(rename = "allocated")]
    Allocated,
    /// Out of service for routine maintenance.
    #[serde(rename = "maintenance")]
    Maintenance,
    /// Out of service while being repaired.
    #[serde(rename = "in repair")]
    InRepair,
    /// Permanently out of service.
    #[serde(rename = "retired")]
    Retired,
}

impl AssetStatus {
    /// Every status, in canonical order.
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::Available,
        AssetStatus::Allocated,
        AssetStatus::Maintenance,
        AssetStatus::InRepair,
        AssetStatus::Retired,
    ];

    /// Returns the canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "available",
            AssetStatus::Allocated => "allocated",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::InRepair => "in repair",
            AssetStatus::Retired => "retired",
        }
    }

    /// Parses a canonical spelling only. The legacy alias is rejected.
    pub fn parse_canonical(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Parses a status as reported by an external system, folding the legacy
    /// `unallocated` alias into [`AssetStatus::Available`].
    pub fn from_wire(value: &str) -> Option<Self> {
        if value == LEGACY_AVAILABLE_ALIAS {
            return Some(AssetStatus::Available);
        }
        Self::parse_canonical(value)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetStatus::Available => write!(f, "Available"),
            AssetStatus::Allocated => write!(f, "Allocated"),
            AssetStatus::Maintenance => write!(f, "Maintenance"),
            AssetStatus::InRepair => write!(f, "In Repair"),
            AssetStatus::Retired => write!(f, "Retired"),
        }
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s.trim()).ok_or_else(|| format!("Unknown asset status: {}", s))
    }
}

/// Returns true iff `value` is one of the five canonical status spellings.
pub fn is_valid_status(value: &str) -> bool {
    AssetStatus::parse_canonical(value).is_some()
}

/// A status exactly as reported by the inventory API.
///
/// Records carrying a value outside the registry are kept rather than
/// rejected; they simply have no legal transitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportedStatus {
    /// A status from the registry.
    Known(AssetStatus),
    /// Anything else, verbatim.
    Unrecognized(String),
}

impl ReportedStatus {
    /// Returns the registry status, if recognized.
    pub fn known(&self) -> Option<AssetStatus> {
        match self {
            ReportedStatus::Known(status) => Some(*status),
            ReportedStatus::Unrecognized(_) => None,
        }
    }

    /// Returns true if this is the given registry status.
    pub fn is(&self, status: AssetStatus) -> bool {
        self.known() == Some(status)
    }

    /// Returns the wire spelling (canonical for known statuses).
    pub fn as_str(&self) -> &str {
        match self {
            ReportedStatus::Known(status) => status.as_str(),
            ReportedStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<AssetStatus> for ReportedStatus {
    fn from(status: AssetStatus) -> Self {
        ReportedStatus::Known(status)
    }
}

impl From<String> for ReportedStatus {
    fn from(value: String) -> Self {
        match AssetStatus::from_wire(&value) {
            Some(status) => ReportedStatus::Known(status),
            None => ReportedStatus::Unrecognized(value),
        }
    }
}

impl From<&str> for ReportedStatus {
    fn from(value: &str) -> Self {
        ReportedStatus::from(value.to_string())
    }
}

impl From<ReportedStatus> for String {
    fn from(status: ReportedStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportedStatus::Known(status) => write!(f, "{}", status),
            ReportedStatus::Unrecognized(raw) => write!(f, "Unknown ({})", raw),
        }
    }
}
