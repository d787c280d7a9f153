//! Logging infrastructure for Asset Keeper.
//!
//! This module provides structured logging using the tracing ecosystem.
//! `RUST_LOG`, when set, replaces the crate-level default filter.

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Crates whose output is enabled by the default filter.
const LOGGED_CRATES: [&str; 4] = ["ak_core", "ak_connectors", "ak_lifecycle", "ak_cli"];

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level.
    pub level: Level,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Whether to include span events.
    pub include_spans: bool,
    /// Whether to include file/line info.
    pub include_location: bool,
    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            include_spans: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a development configuration with more verbose output.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json_format: false,
            include_spans: true,
            include_location: true,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json_format: true,
            include_spans: false,
            include_location: false,
            include_target: true,
        }
    }

    /// Builds a configuration from a level name such as `"info"`.
    ///
    /// Unknown level names fall back to the default level.
    pub fn from_level_name(level: &str, json_format: bool) -> Self {
        let defaults = Self::default();
        Self {
            level: Level::from_str(level.trim()).unwrap_or(defaults.level),
            json_format,
            ..defaults
        }
    }

    /// Returns the filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        LOGGED_CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Initializes the logging system with the given configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    // Logs go to stderr so command output on stdout stays parseable.
    if config.json_format {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(config.include_target);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(config.include_target);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    }
}

/// Creates a span for work on a single asset.
#[macro_export]
macro_rules! asset_span {
    ($asset_id:expr) => {
        tracing::info_span!("asset", asset_id = %$asset_id)
    };
    ($asset_id:expr, $($field:tt)*) => {
        tracing::info_span!("asset", asset_id = %$asset_id, $($field)*)
    };
}
