//! Configuration validation for Asset Keeper.
//!
//! Checks the configuration before any command talks to the inventory API.

use crate::config::{AppConfig, API_KEY_ENV};
use ak_core::Role;
use colored::Colorize;

/// Retries above this make a failing command hang for minutes.
const MAX_REASONABLE_RETRIES: u32 = 5;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that make the configuration unusable.
    pub errors: Vec<String>,
    /// Problems worth fixing that do not block commands.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the application configuration.
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_api(config, &mut result);
        Self::validate_operator(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_api(config: &AppConfig, result: &mut ValidationResult) {
        let api = &config.api;
        let url = api.base_url.trim();

        if url.is_empty() {
            result.add_error(
                "Missing required config: api.base_url. \
                 Set it to the inventory API root (e.g., https://inventory.example.com/dev)."
                    .to_string(),
            );
        } else if !url.starts_with("https://") && !url.starts_with("http://") {
            result.add_error(format!(
                "Invalid api.base_url '{}'. Must start with http:// or https://",
                url
            ));
        } else if url.starts_with("http://") {
            result.add_warning(format!(
                "api.base_url '{}' uses plain HTTP. The API key and asset data \
                 will travel unencrypted.",
                url
            ));
        }

        if api.timeout_secs == 0 {
            result.add_error("api.timeout_secs must be greater than 0".to_string());
        }

        if api.max_retries > MAX_REASONABLE_RETRIES {
            result.add_warning(format!(
                "api.max_retries is {}. Values above {} delay error reporting considerably.",
                api.max_retries, MAX_REASONABLE_RETRIES
            ));
        }

        if api.rate_limit_per_minute == Some(0) {
            result.add_error(
                "api.rate_limit_per_minute must be greater than 0 (omit it to disable)"
                    .to_string(),
            );
        }

        if api.api_key_header.trim().is_empty() {
            result.add_error("api.api_key_header must not be empty".to_string());
        }

        if api.resolved_api_key().is_none() {
            result.add_warning(format!(
                "No API key configured. Set api.api_key or the {} env var \
                 if the inventory gateway requires one.",
                API_KEY_ENV
            ));
        }

        if !api.verify_tls {
            result.add_warning(
                "TLS verification is disabled. This only takes effect in debug builds."
                    .to_string(),
            );
        }
    }

    fn validate_operator(config: &AppConfig, result: &mut ValidationResult) {
        let operator = &config.operator;
        if operator.role == Role::Admin && operator.email.trim().is_empty() {
            result.add_error(
                "operator.email is required for the admin role. \
                 Status history records who made each change."
                    .to_string(),
            );
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = config.logging.level.trim().to_lowercase();
        if !valid_levels.contains(&level.as_str()) {
            result.add_warning(format!(
                "Unknown logging.level '{}'. Must be one of: {}. Falling back to warn.",
                config.logging.level,
                valid_levels.join(", ")
            ));
        }
    }
}
