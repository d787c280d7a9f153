//! Dashboard aggregation.
//!
//! Counts assets by status and by category for the overview cards, and
//! implements the ownership filter used by the asset table.

use crate::models::Asset;
use crate::status::{AssetStatus, ReportedStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Number of assets in each status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub available: usize,
    pub allocated: usize,
    pub maintenance: usize,
    pub in_repair: usize,
    pub retired: usize,
    /// Assets whose status is outside the registry.
    pub unrecognized: usize,
}

impl StatusCounts {
    /// Counts assets, optionally restricted to one category.
    ///
    /// The category filter is case-insensitive; `None` or `"all"` counts
    /// everything.
    pub fn from_assets(assets: &[Asset], category: Option<&str>) -> Self {
        let category = category.filter(|c| !c.trim().eq_ignore_ascii_case("all"));
        let mut counts = Self::default();

        for asset in assets {
            if let Some(category) = category {
                if !asset.matches_category(category) {
                    continue;
                }
            }
            counts.record(&asset.status);
        }

        counts
    }

    fn record(&mut self, status: &ReportedStatus) {
        self.total += 1;
        match status.known() {
            Some(AssetStatus::Available) => self.available += 1,
            Some(AssetStatus::Allocated) => self.allocated += 1,
            Some(AssetStatus::Maintenance) => self.maintenance += 1,
            Some(AssetStatus::InRepair) => self.in_repair += 1,
            Some(AssetStatus::Retired) => self.retired += 1,
            None => self.unrecognized += 1,
        }
    }

    /// Returns the count for a registry status.
    pub fn get(&self, status: AssetStatus) -> usize {
        match status {
            AssetStatus::Available => self.available,
            AssetStatus::Allocated => self.allocated,
            AssetStatus::Maintenance => self.maintenance,
            AssetStatus::InRepair => self.in_repair,
            AssetStatus::Retired => self.retired,
        }
    }
}

/// Number of assets per category, keyed by lower-case category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts(BTreeMap<String, usize>);

impl CategoryCounts {
    pub fn from_assets(assets: &[Asset]) -> Self {
        let mut counts = BTreeMap::new();
        for asset in assets {
            *counts
                .entry(asset.category.as_str().to_string())
                .or_insert(0) += 1;
        }
        Self(counts)
    }

    /// Returns the count for a category (case-insensitive), zero if absent.
    pub fn get(&self, category: &str) -> usize {
        self.0
            .get(&category.trim().to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Iterates categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Ownership filter of the asset table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipFilter {
    #[default]
    All,
    Allocated,
    /// Anything not currently allocated, whatever its status.
    Unallocated,
}

impl OwnershipFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            OwnershipFilter::All => true,
            OwnershipFilter::Allocated => asset.is_allocated(),
            OwnershipFilter::Unallocated => !asset.is_allocated(),
        }
    }
}

impl FromStr for OwnershipFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(OwnershipFilter::All),
            "allocated" => Ok(OwnershipFilter::Allocated),
            "unallocated" => Ok(OwnershipFilter::Unallocated),
            _ => Err(format!("Invalid ownership filter: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetCategory;

    fn inventory() -> Vec<Asset> {
        vec![
            Asset::new("1", "Laptop A", AssetCategory::Laptop),
            Asset::new("2", "Laptop B", AssetCategory::Laptop)
                .with_status(AssetStatus::Allocated)
                .with_owner("alice@example.com"),
            Asset::new("3", "Laptop C", AssetCategory::Laptop).with_status(AssetStatus::InRepair),
            Asset::new("4", "Monitor A", AssetCategory::Monitor)
                .with_status(AssetStatus::Maintenance),
            Asset::new("5", "Mouse A", AssetCategory::Mouse).with_status(AssetStatus::Retired),
            Asset::new("6", "Mystery", AssetCategory::Other).with_status("lost"),
        ]
    }

    #[test]
    fn test_status_counts_all_categories() {
        let counts = StatusCounts::from_assets(&inventory(), None);

        assert_eq!(counts.total, 6);
        assert_eq!(counts.available, 1);
        assert_eq!(counts.allocated, 1);
        assert_eq!(counts.in_repair, 1);
        assert_eq!(counts.maintenance, 1);
        assert_eq!(counts.retired, 1);
        assert_eq!(counts.unrecognized, 1);

        let summed: usize = AssetStatus::ALL.iter().map(|s| counts.get(*s)).sum();
        assert_eq!(summed + counts.unrecognized, counts.total);
    }

    #[test]
    fn test_status_counts_category_filter_is_case_insensitive() {
        let counts = StatusCounts::from_assets(&inventory(), Some("LAPTOP"));
        assert_eq!(counts.total, 3);
        assert_eq!(counts.allocated, 1);
        assert_eq!(counts.maintenance, 0);

        let all = StatusCounts::from_assets(&inventory(), Some("all"));
        assert_eq!(all.total, 6);
    }

    #[test]
    fn test_category_counts() {
        let counts = CategoryCounts::from_assets(&inventory());
        assert_eq!(counts.get("laptop"), 3);
        assert_eq!(counts.get("Monitor"), 1);
        assert_eq!(counts.get("keyboard"), 0);
        assert_eq!(counts.total(), 6);

        let names: Vec<_> = counts.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["laptop", "monitor", "mouse", "other"]);
    }

    #[test]
    fn test_ownership_filter() {
        let assets = inventory();
        let allocated = assets
            .iter()
            .filter(|a| OwnershipFilter::Allocated.matches(a))
            .count();
        let unallocated = assets
            .iter()
            .filter(|a| OwnershipFilter::Unallocated.matches(a))
            .count();

        assert_eq!(allocated, 1);
        assert_eq!(unallocated, 5);
        assert_eq!(
            "Unallocated".parse::<OwnershipFilter>().unwrap(),
            OwnershipFilter::Unallocated
        );
    }
}
