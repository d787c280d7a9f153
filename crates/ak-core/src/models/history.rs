//! Asset status history.
//!
//! The inventory API keeps an audit trail of every status change. Entries are
//! read-only here; this module only filters and orders them.

use crate::status::{AssetStatus, ReportedStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub asset_id: String,
    pub old_status: ReportedStatus,
    pub new_status: ReportedStatus,
    /// Owner after the change, if any.
    #[serde(default)]
    pub owned_by: Option<String>,
    /// Who performed the change.
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    /// Returns true if this entry records an assignment.
    pub fn is_assignment(&self) -> bool {
        self.old_status.is(AssetStatus::Available) && self.new_status.is(AssetStatus::Allocated)
    }

    /// Returns true if this entry records an unassignment.
    pub fn is_unassignment(&self) -> bool {
        self.old_status.is(AssetStatus::Allocated) && self.new_status.is(AssetStatus::Available)
    }

    /// Returns true if this entry sent the asset to repair.
    pub fn is_repair(&self) -> bool {
        self.new_status.is(AssetStatus::InRepair)
    }
}

/// Activity filter for the history view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Assignments,
    Unassignments,
    Repairs,
}

impl HistoryFilter {
    /// Returns true if the entry passes this filter.
    pub fn matches(&self, entry: &StatusChange) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Assignments => entry.is_assignment(),
            HistoryFilter::Unassignments => entry.is_unassignment(),
            HistoryFilter::Repairs => entry.is_repair(),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(HistoryFilter::All),
            "assignments" => Ok(HistoryFilter::Assignments),
            "unassignments" => Ok(HistoryFilter::Unassignments),
            "repairs" => Ok(HistoryFilter::Repairs),
            _ => Err(format!("Invalid history filter: {}", s)),
        }
    }
}

/// Returns the entries passing `filter`, newest first.
pub fn filter_history(entries: &[StatusChange], filter: HistoryFilter) -> Vec<StatusChange> {
    let mut matching: Vec<StatusChange> = entries
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
    matching
}

/// Activity counters for one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetActivity {
    /// Recorded status changes.
    pub total_changes: usize,
    /// Changes into `allocated`.
    pub times_assigned: usize,
    /// Changes into `in repair`.
    pub repairs: usize,
}

impl AssetActivity {
    /// Counts the history entries of `asset_id`.
    pub fn for_asset(entries: &[StatusChange], asset_id: &str) -> Self {
        entries
            .iter()
            .filter(|e| e.asset_id == asset_id)
            .fold(Self::default(), |mut stats, entry| {
                stats.total_changes += 1;
                if entry.new_status.is(AssetStatus::Allocated) {
                    stats.times_assigned += 1;
                }
                if entry.new_status.is(AssetStatus::InRepair) {
                    stats.repairs += 1;
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn change(id: &str, old: &str, new: &str, hour: u32) -> StatusChange {
        StatusChange {
            id: id.to_string(),
            asset_id: "asset-1".to_string(),
            old_status: ReportedStatus::from(old),
            new_status: ReportedStatus::from(new),
            owned_by: None,
            changed_by: "admin@example.com".to_string(),
            changed_at: Utc.with_ymd_and_hms(2025, 1, 10, hour, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<StatusChange> {
        vec![
            change("1", "unallocated", "allocated", 8),
            change("2", "allocated", "unallocated", 9),
            change("3", "available", "in repair", 10),
            change("4", "in repair", "maintenance", 11),
        ]
    }

    #[test]
    fn test_all_is_newest_first() {
        let ids: Vec<_> = filter_history(&sample(), HistoryFilter::All)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["4", "3", "2", "1"]);
    }

    #[test]
    fn test_assignment_filters_use_normalized_statuses() {
        let assignments = filter_history(&sample(), HistoryFilter::Assignments);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].id, "1");

        let unassignments = filter_history(&sample(), HistoryFilter::Unassignments);
        assert_eq!(unassignments.len(), 1);
        assert_eq!(unassignments[0].id, "2");
    }

    #[test]
    fn test_repairs_filter() {
        let repairs = filter_history(&sample(), HistoryFilter::Repairs);
        assert_eq!(repairs.len(), 1);
        assert_eq!(repairs[0].id, "3");
    }

    #[test]
    fn test_asset_activity_counts_one_asset() {
        let mut entries = sample();
        entries.push(change("5", "maintenance", "in repair", 12));
        let mut other = change("6", "available", "allocated", 13);
        other.asset_id = "asset-2".to_string();
        entries.push(other);

        let stats = AssetActivity::for_asset(&entries, "asset-1");
        assert_eq!(
            stats,
            AssetActivity {
                total_changes: 5,
                times_assigned: 1,
                repairs: 2,
            }
        );
        assert_eq!(
            AssetActivity::for_asset(&entries, "missing"),
            AssetActivity::default()
        );
    }

    #[test]
    fn test_history_filter_parsing() {
        assert_eq!(
            "Repairs".parse::<HistoryFilter>().unwrap(),
            HistoryFilter::Repairs
        );
        assert!("everything".parse::<HistoryFilter>().is_err());
    }

    #[test]
    fn test_status_change_deserialization() {
        let json = r#"{
            "id": "9",
            "asset_id": "12",
            "old_status": "unallocated",
            "new_status": "allocated",
            "owned_by": "bob@example.com",
            "changed_by": "admin@example.com",
            "changed_at": "2025-02-01T12:30:00Z"
        }"#;

        let entry: StatusChange = serde_json::from_str(json).unwrap();
        assert!(entry.is_assignment());
        assert_eq!(entry.owned_by.as_deref(), Some("bob@example.com"));
    }
}
