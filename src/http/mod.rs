//! HTTP client module
//!
//! Provides the read-only API handle used by page fetchers.
//!
//! # Features
//!
//! - **Single-shot requests**: one call, one HTTP request, no hidden retries
//! - **Error envelopes**: remote `{"error": {...}}` bodies become typed errors
//! - **Rate Limiting**: optional client-wide token bucket using governor

mod client;
mod rate_limit;

pub use client::{
    ApiClient, ApiClientConfig, ApiClientConfigBuilder, RequestConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_PAGE_SIZE,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
