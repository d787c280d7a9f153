//! Configuration loading for the Asset Keeper CLI.

use ak_connectors::{AuthConfig, ConnectorConfig, RestInventoryConfig, SecureString};
use ak_core::Role;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "ASSET_KEEPER_API_KEY";

const REDACTED: &str = "***REDACTED***";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inventory API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Who is running the CLI.
    #[serde(default)]
    pub operator: OperatorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Creates a copy with secrets redacted.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();
        if !config.api.api_key.is_empty() {
            config.api.api_key = REDACTED.to_string();
        }
        config
    }
}

/// Inventory API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the inventory API, including any stage prefix.
    #[serde(default)]
    pub base_url: String,

    /// API key, if the gateway requires one.
    #[serde(default)]
    pub api_key: String,

    /// Header carrying the API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for server errors and transport failures.
    #[serde(default)]
    pub max_retries: u32,

    /// Whether to verify TLS certificates.
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Client-side request budget.
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout(),
            max_retries: 0,
            verify_tls: true,
            rate_limit_per_minute: None,
        }
    }
}

impl ApiConfig {
    /// Returns the configured API key, falling back to [`API_KEY_ENV`].
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Builds the REST connector configuration.
    pub fn connector_config(&self) -> RestInventoryConfig {
        let auth = match self.resolved_api_key() {
            Some(key) => AuthConfig::ApiKey {
                key: SecureString::new(key),
                header_name: self.api_key_header.clone(),
            },
            None => AuthConfig::None,
        };

        RestInventoryConfig {
            connector: ConnectorConfig {
                name: "inventory".to_string(),
                base_url: self.base_url.clone(),
                auth,
                timeout_secs: self.timeout_secs,
                max_retries: self.max_retries,
                verify_tls: self.verify_tls,
                headers: HashMap::new(),
            },
            rate_limit_per_minute: self.rate_limit_per_minute,
        }
    }
}

/// The person running the CLI, as known to the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Operator e-mail.
    #[serde(default)]
    pub email: String,

    /// Role claim. Only admins may change assets.
    #[serde(default)]
    pub role: Role,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}
