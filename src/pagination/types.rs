//! Pagination types
//!
//! Pages as the consumer sees them, raw responses as the fetcher returns
//! them, and the cursor state owned by a running driver task.

use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::Deserialize;

/// One unit of a result stream
///
/// A page either carries items (possibly none) or, as the last page of a
/// stream, the error that ended it. Failed pages never carry items.
#[derive(Debug)]
pub struct Page<T> {
    /// 1-based position in the stream, assigned by the driver
    pub index: u64,
    /// Records in remote order
    pub items: Vec<T>,
    /// Token to resume after this page, if the remote issued one
    pub next_page_token: Option<String>,
    /// Terminal failure
    pub error: Option<Error>,
}

impl<T> Page<T> {
    /// Create a page of items
    pub fn new(index: u64, items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            index,
            items,
            next_page_token,
            error: None,
        }
    }

    /// Create a terminal failure page
    pub fn failed(index: u64, error: Error) -> Self {
        Self {
            index,
            items: Vec::new(),
            next_page_token: None,
            error: Some(error),
        }
    }

    /// Check if this page ended the stream with an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of items on the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the items, or the error for a failed page
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.items),
        }
    }
}

/// One decoded response of a list call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage<T> {
    /// Records in remote order; a missing array decodes as empty
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Cursor for the next page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> RawPage<T> {
    /// Create a raw page; an empty token means there is no next page
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.none_if_empty(),
        }
    }

    /// Create the final page of a result set
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Collapse an empty token into `None`
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.items, self.next_page_token)
    }
}

/// Why a stream closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_total_items` was reached
    MaxTotalItems,
    /// `max_pages` was reached
    MaxPages,
    /// The remote returned no next page token
    Exhausted,
    /// A remote call failed; the last page carried the error
    Failed,
    /// The consumer closed or dropped the stream
    Cancelled,
}

impl StopReason {
    /// Check if the stream ended without an error or cancellation
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::MaxTotalItems | Self::MaxPages | Self::Exhausted)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaxTotalItems => "max total items reached",
            Self::MaxPages => "max pages reached",
            Self::Exhausted => "no further pages",
            Self::Failed => "remote call failed",
            Self::Cancelled => "cancelled by consumer",
        };
        f.write_str(s)
    }
}

/// Cursor state of one running stream
#[derive(Debug, Clone, Default)]
pub struct CursorState {
    /// Token for the next request, `None` on a fresh first request
    pub page_token: Option<String>,
    /// Index of the last emitted page (0 before the first)
    pub page_index: u64,
    /// Items emitted so far
    pub items_fetched: u64,
}

impl CursorState {
    /// Create cursor state, optionally resuming from a token
    pub fn new(start_token: Option<&str>) -> Self {
        Self {
            page_token: start_token.map(str::to_string).none_if_empty(),
            ..Default::default()
        }
    }

    /// Limit that stops the stream before the next request, if any
    pub fn limit_reached(&self, config: &QueryConfig) -> Option<StopReason> {
        if config.max_total_items > 0 && self.items_fetched >= config.max_total_items {
            return Some(StopReason::MaxTotalItems);
        }
        if config.max_pages > 0 && self.page_index >= config.max_pages {
            return Some(StopReason::MaxPages);
        }
        None
    }

    /// Record a fetched page, returning its index
    pub fn advance(&mut self, item_count: usize, next_token: Option<String>) -> u64 {
        self.items_fetched += item_count as u64;
        self.page_index += 1;
        self.page_token = next_token.none_if_empty();
        self.page_index
    }

    /// Index for a page that failed to fetch
    pub fn failed_index(&self) -> u64 {
        self.page_index + 1
    }

    /// Check if the remote has more pages
    pub fn has_next(&self) -> bool {
        self.page_token.is_some()
    }
}
