//! Asset status transition policy.
//!
//! A single table decides which statuses an asset may move to from its
//! current one. Assignment is the only way into [`AssetStatus::Allocated`],
//! and an allocated asset must be unassigned before anything else can happen
//! to it.

use crate::status::{AssetStatus, ReportedStatus};

impl AssetStatus {
    /// Returns the statuses reachable from this one, in presentation order.
    ///
    /// [`AssetStatus::Allocated`] shows up as a target from
    /// [`AssetStatus::Available`] only; it is reached through assignment, not
    /// the generic status change.
    pub fn valid_transitions(self) -> Vec<AssetStatus> {
        use AssetStatus::*;
        match self {
            Available => vec![Allocated, Maintenance, InRepair, Retired],
            Allocated => vec![Available],
            Maintenance => vec![Available, Retired, InRepair],
            InRepair => vec![Maintenance, Available, Retired],
            Retired => vec![],
        }
    }

    /// Returns the targets reachable through the generic status change,
    /// i.e. [`Self::valid_transitions`] without [`AssetStatus::Allocated`].
    pub fn generic_transitions(self) -> Vec<AssetStatus> {
        if self == AssetStatus::Allocated {
            // Leaving allocation is an unassignment, not a status change.
            return Vec::new();
        }
        self.valid_transitions()
            .into_iter()
            .filter(|s| *s != AssetStatus::Allocated)
            .collect()
    }

    /// Returns true if `target` is in [`Self::valid_transitions`].
    pub fn can_transition_to(self, target: AssetStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Returns true if no transitions leave this status.
    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl ReportedStatus {
    /// Transitions for a reported status; unrecognized values have none.
    pub fn valid_transitions(&self) -> Vec<AssetStatus> {
        self.known()
            .map(AssetStatus::valid_transitions)
            .unwrap_or_default()
    }
}

/// Looks up the legal next statuses for a status string.
///
/// Accepts the legacy `unallocated` alias. Unrecognized input yields an empty
/// list rather than an error.
pub fn valid_transitions(current: &str) -> Vec<AssetStatus> {
    ReportedStatus::from(current).valid_transitions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssetStatus::*;

    #[test]
    fn test_table() {
        assert_eq!(
            valid_transitions("available"),
            vec![Allocated, Maintenance, InRepair, Retired]
        );
        assert_eq!(valid_transitions("allocated"), vec![Available]);
        assert_eq!(
            valid_transitions("maintenance"),
            vec![Available, Retired, InRepair]
        );
        assert_eq!(
            valid_transitions("in repair"),
            vec![Maintenance, Available, Retired]
        );
        assert!(valid_transitions("retired").is_empty());
    }

    #[test]
    fn test_unallocated_alias_matches_available() {
        assert_eq!(
            valid_transitions("unallocated"),
            valid_transitions("available")
        );
        assert_eq!(
            valid_transitions("unallocated"),
            vec![Allocated, Maintenance, InRepair, Retired]
        );
    }

    #[test]
    fn test_unrecognized_status_has_no_transitions() {
        assert!(valid_transitions("").is_empty());
        assert!(valid_transitions("lost").is_empty());
        assert!(valid_transitions("Available").is_empty());
        assert!(valid_transitions("under repair").is_empty());
    }

    #[test]
    fn test_no_self_transitions() {
        for status in AssetStatus::ALL {
            assert!(
                !status.valid_transitions().contains(&status),
                "{:?} lists itself",
                status
            );
        }
    }

    #[test]
    fn test_allocated_only_offered_from_available() {
        for status in [Maintenance, InRepair] {
            assert!(!status.valid_transitions().contains(&Allocated));
        }
    }

    #[test]
    fn test_generic_transitions_never_reach_allocated() {
        for status in AssetStatus::ALL {
            assert!(!status.generic_transitions().contains(&Allocated));
        }
        assert_eq!(
            Available.generic_transitions(),
            vec![Maintenance, InRepair, Retired]
        );
        assert!(Allocated.generic_transitions().is_empty());
    }

    #[test]
    fn test_retired_is_the_only_terminal_status() {
        let terminal: Vec<_> = AssetStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![Retired]);
    }

    #[test]
    fn test_can_transition_to_agrees_with_table() {
        for from in AssetStatus::ALL {
            for to in AssetStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    from.valid_transitions().contains(&to)
                );
            }
        }
    }

    #[test]
    fn test_transitions_are_deterministic() {
        for status in AssetStatus::ALL {
            assert_eq!(
                valid_transitions(status.as_str()),
                valid_transitions(status.as_str())
            );
        }
    }
}
