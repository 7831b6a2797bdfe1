//! Crawl controller
//!
//! Drives one adapter across a portal's result pages, pulling records out
//! lazily. The controller owns pagination, the retry budget for throttles
//! and transient errors, and the stop conditions; fetching is delegated to
//! the rate-limited fetcher and parsing to the adapter.

use crate::crawl::{SearchCriteria, SourceAdapter};
use crate::fetch::{FetchOutcome, RateLimitedFetcher};
use crate::record::RawListingRecord;
use crate::{Result, ScoutError};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consecutive page-parse failures tolerated before the crawl stops
const MAX_PARSE_FAILURES: u32 = 3;

/// Lazy, pull-based crawl over one portal
///
/// Call `next` until it returns `Ok(None)`. The crawl stops on its own when
/// the portal runs out of pages, the `max_results` cap is hit, parsing fails
/// too many pages in a row, or a non-retryable fetch outcome occurs.
pub struct CrawlController {
    adapter: Arc<dyn SourceAdapter>,
    fetcher: Arc<RateLimitedFetcher>,
    criteria: SearchCriteria,
    max_retries: u32,
    page: u32,
    buffer: VecDeque<RawListingRecord>,
    yielded: usize,
    parse_failures: u32,
    done: bool,
}

impl CrawlController {
    /// Creates a controller over one adapter and fetcher
    ///
    /// # Arguments
    ///
    /// * `adapter` - The portal adapter to crawl with
    /// * `fetcher` - Shared rate-limited fetcher
    /// * `criteria` - What to search for
    /// * `max_retries` - Retry budget per page for throttles and transient errors
    pub fn new(
        adapter: Arc<dyn SourceAdapter>,
        fetcher: Arc<RateLimitedFetcher>,
        criteria: SearchCriteria,
        max_retries: u32,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            criteria,
            max_retries,
            page: 1,
            buffer: VecDeque::new(),
            yielded: 0,
            parse_failures: 0,
            done: false,
        }
    }

    /// Pulls the next raw record, fetching further pages as needed
    pub async fn next(&mut self) -> Result<Option<RawListingRecord>> {
        loop {
            if let Some(max) = self.criteria.max_results {
                if self.yielded >= max {
                    self.done = true;
                    return Ok(None);
                }
            }

            if let Some(mut record) = self.buffer.pop_front() {
                if self.criteria.fetch_details {
                    self.fetch_detail(&mut record).await;
                }
                self.yielded += 1;
                return Ok(Some(record));
            }

            if self.done {
                return Ok(None);
            }

            self.fetch_next_page().await?;
        }
    }

    /// Drains the crawl into a vec
    pub async fn collect(&mut self) -> Result<Vec<RawListingRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let request = self.adapter.build_page_request(&self.criteria, self.page)?;
        let body = self.fetch_with_retries(&request.url).await?;

        match self.adapter.parse_items(&body, self.page) {
            Ok(items) => {
                self.parse_failures = 0;
                if items.is_empty() {
                    info!(page = self.page, "portal returned no more results");
                    self.done = true;
                } else {
                    debug!(page = self.page, count = items.len(), "parsed results page");
                    self.buffer.extend(items);
                    self.page += 1;
                }
                Ok(())
            }
            Err(e) => {
                self.parse_failures += 1;
                warn!(
                    page = self.page,
                    failures = self.parse_failures,
                    "failed to parse results page: {e}"
                );
                if self.parse_failures >= MAX_PARSE_FAILURES {
                    self.done = true;
                    return Err(e);
                }
                self.page += 1;
                Ok(())
            }
        }
    }

    async fn fetch_with_retries(&mut self, url: &str) -> Result<String> {
        let mut attempts = 0;

        loop {
            match self.fetcher.fetch(url).await? {
                FetchOutcome::Success { body, .. } => return Ok(body),
                FetchOutcome::Blocked => {
                    self.done = true;
                    return Err(ScoutError::Blocked {
                        url: url.to_string(),
                    });
                }
                FetchOutcome::Throttled => {
                    attempts += 1;
                    if attempts > self.max_retries {
                        self.done = true;
                        return Err(ScoutError::Throttled {
                            url: url.to_string(),
                        });
                    }
                    debug!(url, attempts, "throttled, retrying under pacing");
                }
                FetchOutcome::TransientError { message } => {
                    attempts += 1;
                    if attempts > self.max_retries {
                        self.done = true;
                        return Err(ScoutError::Fetch {
                            url: url.to_string(),
                            message,
                        });
                    }
                    debug!(url, attempts, "transient error, retrying: {message}");
                }
            }
        }
    }

    /// Best-effort detail fetch; the record is kept either way
    async fn fetch_detail(&self, record: &mut RawListingRecord) {
        let url = record.url.clone();

        match self.fetcher.fetch(&url).await {
            Ok(FetchOutcome::Success { body, .. }) => {
                if let Err(e) = self.adapter.parse_detail(record, &body) {
                    warn!(url = %url, "detail parse failed: {e}");
                }
            }
            Ok(_) => warn!(url = %url, "detail fetch did not succeed, keeping summary record"),
            Err(e) => warn!(url = %url, "detail fetch errored: {e}"),
        }
    }
}
