//! HTTP utilities for connectors.
//!
//! Provides an HTTP client with authentication, optional rate limiting and
//! bounded retries, and maps remote failures onto [`ConnectorError`] while
//! keeping the server's own error message when it sends one.

use crate::traits::{AuthConfig, ConnectorConfig, ConnectorError, ConnectorResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client with retry and rate limiting support.
pub struct HttpClient {
    client: Client,
    config: ConnectorConfig,
    rate_limiter: Option<Arc<RateLimiterType>>,
}

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per period.
    pub max_requests: u32,
    /// Period duration.
    pub period: Duration,
    /// Maximum burst size.
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// Allows `max_requests` per minute with a burst of a tenth of that.
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            period: Duration::from_secs(60),
            burst_size: (max_requests / 10).max(1),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(100)
    }
}

impl HttpClient {
    /// Creates a new HTTP client from connector configuration.
    pub fn new(config: ConnectorConfig) -> ConnectorResult<Self> {
        Self::with_rate_limit(config, None)
    }

    /// Creates a new HTTP client with rate limiting.
    pub fn with_rate_limit(
        config: ConnectorConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> ConnectorResult<Self> {
        // TLS verification can only be switched off in debug builds.
        let verify_tls = if !config.verify_tls {
            if cfg!(debug_assertions) {
                warn!(
                    base_url = %config.base_url,
                    connector_name = %config.name,
                    "TLS certificate verification DISABLED in development mode"
                );
                false
            } else {
                warn!(
                    base_url = %config.base_url,
                    connector_name = %config.name,
                    "Ignoring request to disable TLS verification in a release build"
                );
                true
            }
        } else {
            true
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            let name = reqwest::header::HeaderName::try_from(key.as_str())
                .map_err(|e| ConnectorError::ConfigError(format!("Header {}: {}", key, e)))?;
            let value = reqwest::header::HeaderValue::try_from(value.as_str())
                .map_err(|e| ConnectorError::ConfigError(format!("Header {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectorError::ConfigError(e.to_string()))?;

        let rate_limiter = match rate_limit {
            Some(rl) => Some(Arc::new(build_rate_limiter(&rl)?)),
            None => None,
        };

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Builds a URL from a path.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Executes a GET request.
    pub async fn get(&self, path: &str) -> ConnectorResult<Response> {
        let request = self.client.get(self.build_url(path));
        self.execute_with_retry(request).await
    }

    /// Executes a GET request and deserializes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConnectorResult<T> {
        let response = self.get(path).await?;
        parse_json_response(response).await
    }

    /// Executes a POST request with a JSON body and returns the JSON reply,
    /// `Value::Null` if the reply is empty.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> ConnectorResult<serde_json::Value> {
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.execute_with_retry(request).await?;
        parse_optional_json(response).await
    }

    /// Executes a PUT request with a JSON body and returns the JSON reply,
    /// `Value::Null` if the reply is empty.
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> ConnectorResult<serde_json::Value> {
        let request = self.client.put(self.build_url(path)).json(body);
        let response = self.execute_with_retry(request).await?;
        parse_optional_json(response).await
    }

    /// Executes a PUT request without a body.
    pub async fn put_empty(&self, path: &str) -> ConnectorResult<serde_json::Value> {
        let request = self.client.put(self.build_url(path));
        let response = self.execute_with_retry(request).await?;
        parse_optional_json(response).await
    }

    /// Executes a request with authentication, rate limiting, retries, and
    /// error mapping.
    async fn execute_with_retry(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> ConnectorResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        request = self.add_auth(request);

        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} after {:?}", attempt, delay);
                sleep(delay).await;
                delay = std::cmp::min(delay * 2 + rand_jitter(), Duration::from_secs(30));
            }

            let request_clone = request
                .try_clone()
                .ok_or_else(|| ConnectorError::Internal("Failed to clone request".to_string()))?;

            match request_clone.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!("Rate limited, retry after {} seconds", retry_after);
                        return Err(ConnectorError::RateLimited(retry_after));
                    }

                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!("Server error {}, retrying...", status);
                        last_error = Some(ConnectorError::Rejected {
                            status: status.as_u16(),
                            message: format!("Server error: {}", status),
                        });
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(error_for_status(status, &body));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        ConnectorError::Timeout(e.to_string())
                    } else if e.is_connect() {
                        ConnectorError::ConnectionFailed(e.to_string())
                    } else {
                        ConnectorError::RequestFailed(e.to_string())
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ConnectorError::Internal("Unknown error".to_string())))
    }

    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey { key, header_name } => {
                request.header(header_name, key.expose_secret())
            }
            AuthConfig::BearerToken { token } => {
                request.header("Authorization", format!("Bearer {}", token.expose_secret()))
            }
        }
    }
}

fn build_rate_limiter(config: &RateLimitConfig) -> ConnectorResult<RateLimiterType> {
    let max_requests = config.max_requests.max(1);
    let quota = Quota::with_period(config.period / max_requests)
        .ok_or_else(|| ConnectorError::ConfigError("Invalid rate limit period".to_string()))?
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));
    Ok(GovernorRateLimiter::direct(quota))
}

async fn parse_json_response<T: DeserializeOwned>(response: Response) -> ConnectorResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ConnectorError::InvalidResponse(e.to_string()))?;

    serde_json::from_str(&text).map_err(|e| {
        ConnectorError::InvalidResponse(format!(
            "Failed to parse response (status {}): {} - Body: {}",
            status,
            e,
            text.chars().take(500).collect::<String>()
        ))
    })
}

async fn parse_optional_json(response: Response) -> ConnectorResult<serde_json::Value> {
    let text = response
        .text()
        .await
        .map_err(|e| ConnectorError::InvalidResponse(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    // Mutation endpoints are not guaranteed to answer with JSON.
    Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
}

/// Extracts the server's explanation from an error body, if it has one.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

/// Maps a non-success HTTP status onto a connector error.
pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ConnectorError {
    let message = server_message(body);
    match status {
        StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed(
            message.unwrap_or_else(|| "Unauthorized".to_string()),
        ),
        StatusCode::FORBIDDEN => ConnectorError::AuthorizationDenied(
            message.unwrap_or_else(|| "Forbidden".to_string()),
        ),
        StatusCode::NOT_FOUND => {
            ConnectorError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string()))
        }
        _ => ConnectorError::Rejected {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                format!(
                    "Request failed: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            }),
        },
    }
}

/// Generate a small random jitter for exponential backoff.
fn rand_jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::Instant::now().hash(&mut hasher);
    Duration::from_millis(hasher.finish() % 100)
}
