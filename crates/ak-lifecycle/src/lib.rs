//! # ak-lifecycle
//!
//! The asset lifecycle service.
//!
//! [`LifecycleService`] validates a requested change against the transition
//! policy in `ak-core` before asking the inventory system to carry it out.
//! Illegal requests never reach the network, and the caller's snapshot of an
//! asset is never modified: on success the service hands back the record as
//! the inventory system now holds it.

pub mod error;
pub mod service;

pub use error::{LifecycleError, LifecycleResult};
pub use service::{available_actions, LifecycleAction, LifecycleService};
