//! # ak-observability
//!
//! Logging infrastructure for Asset Keeper, built on `tracing`.

pub mod logging;

pub use logging::{init_logging_with_config, LoggingConfig};
