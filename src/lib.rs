// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagestream
//!
//! Turns one logical query against a paginated list API ("most popular
//! videos", "search for X") into a paced, bounded, asynchronously produced
//! stream of result pages.
//!
//! ## Features
//!
//! - **Independent limits**: max pages, page size hint, max total items
//! - **Pacing**: fixed delay between the end of one page and the next request
//! - **Backpressure**: at most one fetched page waits for the consumer
//! - **Partial failure**: a remote error arrives as the last page, after
//!   every page that was already fetched
//! - **Cancellation**: closing or dropping the stream stops the producer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagestream::{queries, ApiClient, PaginationDriver, QueryConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::with_key("AIza...")?;
//!     let config = QueryConfig::new().with_max_pages(2).with_max_items_per_page(10);
//!
//!     let mut stream = PaginationDriver::new(queries::most_popular(&client)?, config)?.start();
//!     while let Some(page) = stream.next_page().await {
//!         let items = page.into_result()?;
//!         println!("{} videos", items.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  caller ── QueryConfig ──▶ PaginationDriver ──spawn──▶ producer task
//!                                                        │  limits → pacing → reserve slot
//!                                                        │  → PageFetcher::execute
//!    ◀──────────── PageStream ◀── mpsc(1) ◀── Page ──────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Query, pacing and file configuration
pub mod config;

/// API client and rate limiting
pub mod http;

/// Page fetchers and the pagination driver
pub mod pagination;

/// Built-in video list queries
pub mod queries;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{PacingConfig, QueryConfig};
pub use error::{Error, Result};
pub use http::{ApiClient, ApiClientConfig};
pub use pagination::{
    ListCall, Page, PageFetcher, PageStream, PaginationDriver, RawPage, StopReason,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
