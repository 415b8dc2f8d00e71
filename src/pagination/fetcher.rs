//! Page fetchers
//!
//! A fetcher binds the fixed filter criteria of one query and runs exactly
//! one remote call per `execute`, attaching the page token and the size
//! hint only when they are present.

use super::types::RawPage;
use crate::error::{Error, Result};
use crate::http::{ApiClient, RequestConfig};
use crate::types::StringMap;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Default name of the page token query parameter
pub const DEFAULT_TOKEN_PARAM: &str = "pageToken";

/// Default name of the page size query parameter
pub const DEFAULT_SIZE_PARAM: &str = "maxResults";

/// One remote list operation with its filters already bound
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Record type of a page
    type Item: Send + 'static;

    /// Run one remote call; errors are returned, never retried
    async fn execute(
        &self,
        page_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<RawPage<Self::Item>>;

    /// Largest page size the remote accepts, if known
    fn max_page_size(&self) -> Option<u32> {
        None
    }
}

/// HTTP list call against an `ApiClient` endpoint
pub struct ListCall<T> {
    client: ApiClient,
    path: String,
    params: StringMap,
    token_param: String,
    size_param: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListCall<T> {
    /// Create a list call for an endpoint path
    pub fn new(client: ApiClient, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(Error::missing_field("path"));
        }
        Ok(Self {
            client,
            path,
            params: HashMap::new(),
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
            size_param: DEFAULT_SIZE_PARAM.to_string(),
            _item: PhantomData,
        })
    }

    /// Bind a fixed filter parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Rename the page token parameter
    #[must_use]
    pub fn token_param(mut self, name: impl Into<String>) -> Self {
        self.token_param = name.into();
        self
    }

    /// Rename the page size parameter
    #[must_use]
    pub fn size_param(mut self, name: impl Into<String>) -> Self {
        self.size_param = name.into();
        self
    }

    /// Endpoint path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fixed filter parameters
    pub fn params(&self) -> &StringMap {
        &self.params
    }

    /// Build the request for one call
    pub fn request_for(&self, page_token: Option<&str>, max_results: Option<u32>) -> RequestConfig {
        let mut request = RequestConfig::new();
        for (key, value) in &self.params {
            request = request.query(key, value);
        }
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            request = request.query(&self.token_param, token);
        }
        if let Some(max) = max_results.filter(|m| *m > 0) {
            request = request.query(&self.size_param, max.to_string());
        }
        request
    }
}

impl<T> std::fmt::Debug for ListCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCall")
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> PageFetcher for ListCall<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    async fn execute(
        &self,
        page_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<RawPage<T>> {
        let request = self.request_for(page_token, max_results);
        let raw: RawPage<T> = self.client.get_json(&self.path, &request).await?;
        Ok(raw.normalized())
    }

    fn max_page_size(&self) -> Option<u32> {
        Some(self.client.max_page_size())
    }
}
