//! Lifecycle errors.

use ak_connectors::ConnectorError;
use ak_core::AssetStatus;
use thiserror::Error;

/// Errors returned by lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The requested change is not reachable from the asset's current
    /// status. `from` is the status as reported, which may be outside the
    /// registry.
    #[error("Illegal transition for asset {asset_id}: '{from}' -> '{}'", .to.as_str())]
    IllegalTransition {
        asset_id: String,
        from: String,
        to: AssetStatus,
    },

    #[error("Invalid assignee for asset {asset_id}: user id is empty")]
    InvalidAssignee { asset_id: String },

    /// The inventory system failed or refused the request.
    #[error(transparent)]
    RemoteFailure(#[from] ConnectorError),
}

impl LifecycleError {
    /// Returns true if the request was rejected before any remote call.
    pub fn is_local(&self) -> bool {
        !matches!(self, LifecycleError::RemoteFailure(_))
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_transition_message() {
        let err = LifecycleError::IllegalTransition {
            asset_id: "7".to_string(),
            from: "retired".to_string(),
            to: AssetStatus::InRepair,
        };
        assert_eq!(
            err.to_string(),
            "Illegal transition for asset 7: 'retired' -> 'in repair'"
        );
        assert!(err.is_local());
    }

    #[test]
    fn test_remote_failure_shows_server_message() {
        let err = LifecycleError::from(ConnectorError::Rejected {
            status: 409,
            message: "Asset is already allocated".to_string(),
        });
        assert_eq!(err.to_string(), "Asset is already allocated");
        assert!(!err.is_local());
    }
}
