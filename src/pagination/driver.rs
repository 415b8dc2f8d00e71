//! Pagination driver
//!
//! Runs one query as a background task and hands its pages to the caller
//! through a bounded channel.
//!
//! Per iteration the task checks the limits, waits out the pacing interval
//! (never before the first request or after the last page), waits for the
//! consumer to free the single channel slot, then issues one request. The
//! channel slot is reserved before the request, so at most one fetched page
//! is ever waiting for the consumer. A closed or dropped receiver is noticed
//! at every suspension point and ends the task with `StopReason::Cancelled`.

use super::fetcher::PageFetcher;
use super::types::{CursorState, Page, StopReason};
use crate::config::{PacingConfig, QueryConfig};
use crate::error::{Error, Result};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drives a fetcher through successive pages of one query
pub struct PaginationDriver<F> {
    fetcher: F,
    config: QueryConfig,
    pacing: PacingConfig,
}

impl<F> std::fmt::Debug for PaginationDriver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationDriver")
            .field("config", &self.config)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> PaginationDriver<F> {
    /// Create a driver, validating the config against the fetcher
    pub fn new(fetcher: F, config: QueryConfig) -> Result<Self> {
        config.validate(fetcher.max_page_size())?;
        Ok(Self {
            fetcher,
            config,
            pacing: PacingConfig::default(),
        })
    }

    /// Set the pacing interval
    #[must_use]
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Query config of this driver
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Spawn the producer task and return the consumer side
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> PageStream<F::Item> {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(self.run(tx));
        PageStream { rx, handle }
    }

    async fn run(self, tx: mpsc::Sender<Page<F::Item>>) -> StopReason {
        let mut cursor = CursorState::new(self.config.start_page_token());
        let reason = self.drive(&tx, &mut cursor).await;

        match reason {
            StopReason::Cancelled => warn!(
                pages = cursor.page_index,
                items = cursor.items_fetched,
                "consumer went away, stopping stream"
            ),
            _ => info!(
                pages = cursor.page_index,
                items = cursor.items_fetched,
                reason = %reason,
                "stream closed"
            ),
        }
        reason
    }

    async fn drive(
        &self,
        tx: &mpsc::Sender<Page<F::Item>>,
        cursor: &mut CursorState,
    ) -> StopReason {
        let page_size = self.config.page_size_hint();

        loop {
            if let Some(reason) = cursor.limit_reached(&self.config) {
                return reason;
            }

            if cursor.page_index > 0 && self.pacing.is_enabled() {
                tokio::select! {
                    () = tokio::time::sleep(self.pacing.interval) => {}
                    () = tx.closed() => return StopReason::Cancelled,
                }
            }

            // Wait for the consumer to take the previous page.
            let Ok(permit) = tx.reserve().await else {
                return StopReason::Cancelled;
            };

            debug!(
                page = cursor.failed_index(),
                token = cursor.page_token.as_deref().unwrap_or(""),
                "fetching page"
            );

            let result = tokio::select! {
                result = self.fetcher.execute(cursor.page_token.as_deref(), page_size) => result,
                () = tx.closed() => return StopReason::Cancelled,
            };

            match result {
                Ok(raw) => {
                    let count = raw.items.len();
                    let index = cursor.advance(count, raw.next_page_token);
                    debug!(
                        page = index,
                        items = count,
                        total = cursor.items_fetched,
                        "page fetched"
                    );
                    permit.send(Page::new(index, raw.items, cursor.page_token.clone()));
                }
                Err(error) => {
                    let index = cursor.failed_index();
                    warn!(page = index, error = %error, "page fetch failed");
                    permit.send(Page::failed(index, error));
                    return StopReason::Failed;
                }
            }

            if !cursor.has_next() {
                return StopReason::Exhausted;
            }
        }
    }
}

/// Consumer side of a running query
///
/// Pages arrive in index order. The stream ends after the last page; a page
/// carrying an error is always the last one. Dropping the stream stops the
/// producer task.
#[derive(Debug)]
pub struct PageStream<T> {
    rx: mpsc::Receiver<Page<T>>,
    handle: JoinHandle<StopReason>,
}

impl<T> PageStream<T> {
    /// Receive the next page, `None` once the stream is closed
    pub async fn next_page(&mut self) -> Option<Page<T>> {
        self.rx.recv().await
    }

    /// Stop the producer; pages already buffered can still be read
    pub fn cancel(&mut self) {
        self.rx.close();
    }

    /// Drop any unread pages and wait for the producer to finish
    pub async fn finish(self) -> Result<StopReason> {
        let Self { rx, handle } = self;
        drop(rx);
        handle
            .await
            .map_err(|e| Error::task_failed(e.to_string()))
    }

    /// Drain the stream into one list, failing on an error page or a
    /// crashed producer
    pub async fn collect_items(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await {
            items.extend(page.into_result()?);
        }
        self.finish().await?;
        Ok(items)
    }
}

impl<T> Stream for PageStream<T> {
    type Item = Page<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
