//! API client for paginated list endpoints
//!
//! One `get_json` call is exactly one HTTP request. Retries are deliberately
//! absent: a failure is returned to the caller as-is and the pagination
//! driver turns it into the terminal page of its stream.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::StringMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default base URL (YouTube Data API v3)
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest `maxResults` the default remote accepts
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 50;

/// Query parameter carrying the API key
const API_KEY_PARAM: &str = "key";

/// Configuration for the API client
#[derive(Clone)]
pub struct ApiClientConfig {
    /// Base URL all endpoint paths are resolved against
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Client-wide rate limit shared by all streams
    pub rate_limit: Option<RateLimiterConfig>,
    /// Largest page size the remote accepts
    pub max_page_size: u32,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            rate_limit: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_headers: HashMap::new(),
            user_agent: format!("pagestream/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("max_page_size", &self.max_page_size)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl ApiClientConfig {
    /// Create a new config builder
    pub fn builder() -> ApiClientConfigBuilder {
        ApiClientConfigBuilder::default()
    }
}

/// Builder for API client config
#[derive(Default)]
pub struct ApiClientConfigBuilder {
    config: ApiClientConfig,
}

impl ApiClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set a client-wide rate limit
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set the page size ceiling
    pub fn max_page_size(mut self, max: u32) -> Self {
        self.config.max_page_size = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ApiClientConfig {
        self.config
    }
}

/// Per-request parameters
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: StringMap,
    /// Request headers
    pub headers: StringMap,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Read-only API handle
///
/// Cloning is cheap; every clone shares the same connection pool and rate
/// limiter, so concurrent streams may each hold one.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: Client,
    base_url: Url,
    config: ApiClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl ApiClient {
    /// Create a client, validating the key and base URL
    pub fn new(mut config: ApiClientConfig) -> Result<Self> {
        config.api_key = config.api_key.trim().to_string();
        if config.api_key.is_empty() {
            return Err(Error::missing_field("api_key"));
        }

        let mut base = config.base_url.trim().to_string();
        if base.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            inner: Arc::new(ClientInner {
                client,
                base_url,
                config,
                rate_limiter,
            }),
        })
    }

    /// Create a client for the default remote with just a key
    pub fn with_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ApiClientConfig::builder().api_key(api_key).build())
    }

    /// Client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.inner.config
    }

    /// Largest page size the remote accepts
    pub fn max_page_size(&self) -> u32 {
        self.inner.config.max_page_size
    }

    /// Check if a client-wide rate limit is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.inner.rate_limiter.is_some()
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Issue one GET request and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &RequestConfig,
    ) -> Result<T> {
        let url = self.endpoint_url(path)?;

        if let Some(ref limiter) = self.inner.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .inner
            .client
            .get(url.clone())
            .query(&[(API_KEY_PARAM, self.inner.config.api_key.as_str())]);

        for (key, value) in &self.inner.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        debug!(url = %url, params = ?request.query, "GET");

        let response = req.send().await.map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Invalid response body from {path}: {e}")))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.inner.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(e)
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("has_rate_limiter", &self.inner.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Error envelope returned by Google-style APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Map a non-success response to an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimited {
            retry_after_seconds: extract_retry_after(&response),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(parse_error_body(status.as_u16(), body))
}

/// Prefer the remote's own error message when the body carries one
fn parse_error_body(status: u16, body: String) -> Error {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Error::remote(envelope.error.code.unwrap_or(status), envelope.error.message),
        Err(_) => Error::http_status(status, body),
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
