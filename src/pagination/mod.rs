//! Pagination module
//!
//! Turns one logical query into a paced, bounded stream of result pages.
//!
//! # Overview
//!
//! - `PageFetcher` - one remote list call with its filters bound
//! - `ListCall` - the HTTP fetcher used by the built-in queries
//! - `PaginationDriver` - the stop/continue loop, run as a background task
//! - `PageStream` - the consumer side, a `futures::Stream` of `Page`s
//!
//! A stream stops before the next request as soon as `max_total_items` or
//! `max_pages` is reached, after a page with no next token, or after the
//! first failed call. The failed call's error travels as the last page,
//! indexed one past the last successful page.

mod driver;
mod fetcher;
mod types;

pub use driver::{PageStream, PaginationDriver};
pub use fetcher::{ListCall, PageFetcher, DEFAULT_SIZE_PARAM, DEFAULT_TOKEN_PARAM};
pub use types::{CursorState, Page, RawPage, StopReason};
