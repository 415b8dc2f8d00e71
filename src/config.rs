//! Configuration types
//!
//! `QueryConfig` is the per-stream request surface: the query text, the
//! optional related entity, an optional resume token and the three limits.
//! `FileConfig` is what a YAML or JSON config file deserializes into.

use crate::error::{Error, Result};
use crate::http::{ApiClientConfig, RateLimiterConfig};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay between the end of one page and the next request
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

// ============================================================================
// Query Config
// ============================================================================

/// Caller-supplied configuration for one stream
///
/// Every limit is independent and zero means unbounded along that axis.
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Free-text query, meaning depends on the operation
    #[serde(default)]
    pub query: Option<String>,

    /// Entity the results must be related to
    #[serde(default)]
    pub related_entity_id: Option<String>,

    /// Opaque cursor to resume from
    #[serde(default)]
    pub start_page_token: Option<String>,

    /// Maximum pages to emit (0 = unbounded)
    #[serde(default)]
    pub max_pages: u64,

    /// Page size hint sent to the remote (0 = remote default)
    #[serde(default)]
    pub max_items_per_page: u32,

    /// Stop once this many items were emitted (0 = unbounded)
    #[serde(default)]
    pub max_total_items: u64,
}

impl QueryConfig {
    /// Create an unbounded config with no query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query text
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into().none_if_empty();
        self
    }

    /// Set the related entity id
    #[must_use]
    pub fn with_related_entity(mut self, id: impl Into<String>) -> Self {
        self.related_entity_id = id.into().none_if_empty();
        self
    }

    /// Resume from a previously captured page token
    #[must_use]
    pub fn with_start_page_token(mut self, token: impl Into<String>) -> Self {
        self.start_page_token = token.into().none_if_empty();
        self
    }

    /// Set max pages
    #[must_use]
    pub fn with_max_pages(mut self, max: u64) -> Self {
        self.max_pages = max;
        self
    }

    /// Set the per-page size hint
    #[must_use]
    pub fn with_max_items_per_page(mut self, max: u32) -> Self {
        self.max_items_per_page = max;
        self
    }

    /// Set max total items
    #[must_use]
    pub fn with_max_total_items(mut self, max: u64) -> Self {
        self.max_total_items = max;
        self
    }

    /// Query text, `None` when unset or empty
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|s| !s.is_empty())
    }

    /// Related entity id, `None` when unset or empty
    pub fn related_entity_id(&self) -> Option<&str> {
        self.related_entity_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Start token, `None` when unset or empty
    pub fn start_page_token(&self) -> Option<&str> {
        self.start_page_token.as_deref().filter(|s| !s.is_empty())
    }

    /// Page size hint to send, `None` when the remote default applies
    pub fn page_size_hint(&self) -> Option<u32> {
        (self.max_items_per_page > 0).then_some(self.max_items_per_page)
    }

    /// Check the config against the fetcher's page size ceiling
    pub fn validate(&self, max_page_size: Option<u32>) -> Result<()> {
        if let (Some(hint), Some(ceiling)) = (self.page_size_hint(), max_page_size) {
            if hint > ceiling {
                return Err(Error::invalid_value(
                    "max_items_per_page",
                    format!("{hint} exceeds the remote maximum of {ceiling}"),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Pacing
// ============================================================================

/// Minimum delay between the end of one page and the start of the next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Delay; zero disables pacing
    pub interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PACING,
        }
    }
}

impl PacingConfig {
    /// Create a pacing config with the given interval
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Create a pacing config from milliseconds
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// No delay between requests
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Whether any delay applies
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

// ============================================================================
// File Config
// ============================================================================

/// Top-level config file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// API client settings
    #[serde(default)]
    pub client: ClientSection,

    /// Pacing interval in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Default query settings
    #[serde(default)]
    pub query: QueryConfig,
}

fn default_pacing_ms() -> u64 {
    DEFAULT_PACING.as_millis() as u64
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            client: ClientSection::default(),
            pacing_ms: default_pacing_ms(),
            query: QueryConfig::default(),
        }
    }
}

impl FileConfig {
    /// Pacing as a typed config
    pub fn pacing(&self) -> PacingConfig {
        PacingConfig::from_millis(self.pacing_ms)
    }
}

/// API client section of a config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    /// Base URL of the remote API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (usually supplied by flag or environment instead)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Largest page size the remote accepts
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Client-wide rate limit shared by all streams
    #[serde(default)]
    pub rate_limit: Option<RateLimitSection>,
}

fn default_base_url() -> String {
    crate::http::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_page_size() -> u32 {
    crate::http::DEFAULT_MAX_PAGE_SIZE
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            user_agent: None,
            max_page_size: default_max_page_size(),
            rate_limit: None,
        }
    }
}

impl ClientSection {
    /// Convert into a runtime client config using the given key
    pub fn to_client_config(&self, api_key: impl Into<String>) -> ApiClientConfig {
        let mut builder = ApiClientConfig::builder()
            .base_url(&self.base_url)
            .api_key(api_key)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_page_size(self.max_page_size);

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(limit) = &self.rate_limit {
            builder = builder.rate_limit(RateLimiterConfig::new(
                limit.requests_per_second,
                limit.burst_size,
            ));
        }
        builder.build()
    }
}

/// Rate limit section of a config file
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitSection {
    /// Requests per second
    pub requests_per_second: u32,
    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

/// Load a config file (YAML or JSON, chosen by extension)
pub fn load_config(path: impl AsRef<Path>) -> Result<FileConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_config_from_json(&content)
    } else {
        load_config_from_yaml(&content)
    }
}

/// Parse a YAML config string
pub fn load_config_from_yaml(yaml: &str) -> Result<FileConfig> {
    let config: FileConfig = serde_yaml::from_str(yaml)?;
    validate_file_config(&config)?;
    Ok(config)
}

/// Parse a JSON config string
pub fn load_config_from_json(json: &str) -> Result<FileConfig> {
    let config: FileConfig = serde_json::from_str(json)?;
    validate_file_config(&config)?;
    Ok(config)
}

fn validate_file_config(config: &FileConfig) -> Result<()> {
    if config.client.base_url.trim().is_empty() {
        return Err(Error::missing_field("client.base_url"));
    }
    if config.client.max_page_size == 0 {
        return Err(Error::invalid_value(
            "client.max_page_size",
            "must be greater than zero",
        ));
    }
    config.query.validate(Some(config.client.max_page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_query_config_default_is_unbounded() {
        let config = QueryConfig::default();
        assert_eq!(config.max_pages, 0);
        assert_eq!(config.max_items_per_page, 0);
        assert_eq!(config.max_total_items, 0);
        assert!(config.query().is_none());
        assert!(config.related_entity_id().is_none());
        assert!(config.start_page_token().is_none());
        assert!(config.page_size_hint().is_none());
    }

    #[test]
    fn test_query_config_builder() {
        let config = QueryConfig::new()
            .with_query("rust")
            .with_related_entity("abc123")
            .with_start_page_token("T1")
            .with_max_pages(2)
            .with_max_items_per_page(10)
            .with_max_total_items(15);

        assert_eq!(config.query(), Some("rust"));
        assert_eq!(config.related_entity_id(), Some("abc123"));
        assert_eq!(config.start_page_token(), Some("T1"));
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.page_size_hint(), Some(10));
        assert_eq!(config.max_total_items, 15);
    }

    #[test]
    fn test_query_config_empty_strings_are_unset() {
        let config = QueryConfig::new()
            .with_query("")
            .with_related_entity("")
            .with_start_page_token("");
        assert_eq!(config, QueryConfig::default());

        let config = QueryConfig {
            start_page_token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.start_page_token().is_none());
    }

    #[test]
    fn test_query_config_validate() {
        let config = QueryConfig::new().with_max_items_per_page(50);
        assert!(config.validate(Some(50)).is_ok());
        assert!(config.validate(None).is_ok());

        let err = QueryConfig::new()
            .with_max_items_per_page(51)
            .validate(Some(50))
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("max_items_per_page"));

        // zero means remote default and never exceeds the ceiling
        assert!(QueryConfig::new().validate(Some(1)).is_ok());
    }

    #[test]
    fn test_query_config_serde_field_names() {
        let config: QueryConfig = serde_json::from_str(
            r#"{"query": "cats", "related_entity_id": "v1", "max_pages": 3, "max_items_per_page": 5}"#,
        )
        .unwrap();
        assert_eq!(config.query(), Some("cats"));
        assert_eq!(config.related_entity_id(), Some("v1"));
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_items_per_page, 5);
        assert_eq!(config.max_total_items, 0);
    }

    #[test]
    fn test_pacing_config() {
        assert_eq!(PacingConfig::default().interval, Duration::from_millis(100));
        assert!(PacingConfig::default().is_enabled());
        assert!(!PacingConfig::none().is_enabled());
        assert_eq!(
            PacingConfig::from_millis(250).interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_load_config_from_yaml() {
        let yaml = r#"
client:
  base_url: "http://localhost:9999/v3"
  timeout_seconds: 5
  max_page_size: 25
  rate_limit:
    requests_per_second: 4
pacing_ms: 20
query:
  max_pages: 2
  max_items_per_page: 10
"#;
        let config = load_config_from_yaml(yaml).unwrap();
        assert_eq!(config.client.base_url, "http://localhost:9999/v3");
        assert_eq!(config.client.timeout_seconds, 5);
        assert_eq!(config.client.max_page_size, 25);
        let limit = config.client.rate_limit.unwrap();
        assert_eq!(limit.requests_per_second, 4);
        assert_eq!(limit.burst_size, 1);
        assert_eq!(config.pacing(), PacingConfig::from_millis(20));
        assert_eq!(config.query.max_pages, 2);
        assert_eq!(config.query.max_items_per_page, 10);
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config_from_yaml("{}").unwrap();
        assert_eq!(config.client.base_url, crate::http::DEFAULT_BASE_URL);
        assert_eq!(config.client.timeout_seconds, 30);
        assert_eq!(config.pacing_ms, 100);
        assert!(config.client.rate_limit.is_none());
    }

    #[test]
    fn test_load_config_rejects_oversized_page() {
        let yaml = "client:\n  max_page_size: 10\nquery:\n  max_items_per_page: 11\n";
        let err = load_config_from_yaml(yaml).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_load_config_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"client": {{"base_url": "http://example.test"}}, "query": {{"query": "news"}}}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.client.base_url, "http://example.test");
        assert_eq!(config.query.query(), Some("news"));
    }

    #[test]
    fn test_load_config_malformed_json() {
        let err = load_config_from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::JsonParse(_)));
        assert!(err.is_config());
        assert!(!err.is_remote());

        let err = load_config_from_yaml("client: [unclosed").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_client_section_to_client_config() {
        let section = ClientSection {
            user_agent: Some("bot/1.0".to_string()),
            rate_limit: Some(RateLimitSection {
                requests_per_second: 2,
                burst_size: 2,
            }),
            ..Default::default()
        };
        let config = section.to_client_config("key-1");
        assert_eq!(config.api_key, "key-1");
        assert_eq!(config.user_agent, "bot/1.0");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.rate_limit.is_some());
    }
}
