//! Cursor pagination over a remote search API.
//!
//! Drives an opaque server-issued cursor until exhaustion and yields a
//! flat sequence of records. The stream is infinite in principle (bounded
//! only by the remote API) and not restartable mid-flight: a restart
//! re-issues the request sequence from the start cursor, and previously
//! stored identity keys let the caller skip re-emission.

use std::collections::VecDeque;
use std::time::Duration;

use crate::http::FetchError;
use crate::record::Record;

/// Start-of-sequence cursor sentinel (both Crossref and Europe PMC use `*`).
pub const START_CURSOR: &str = "*";

/// Cooldown after HTTP 429 before retrying the same request.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// Cooldown after any other transient failure before retrying.
pub const TRANSIENT_DELAY: Duration = Duration::from_secs(30);

/// Politeness delay between successful page fetches.
pub const PAGE_DELAY: Duration = Duration::from_secs(1);

/// One page of results from the remote API.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<Record>,
    pub next_cursor: Option<String>,
    pub total_results: Option<u64>,
}

/// A cursor-paginated search endpoint. Implementations hold the query and
/// all source-specific parameters; only the cursor varies between calls.
pub trait PageFetcher {
    fn fetch_page(&self, cursor: &str) -> Result<Page, FetchError>;

    /// Requested page size; a batch smaller than this terminates the stream.
    fn page_size(&self) -> usize;
}

/// Fixed-delay, unlimited-attempt retry policy.
///
/// A long-running batch harvest never gives up on a page: rate limiting
/// and transient failures both sleep and re-issue the same request. A
/// permanently broken endpoint therefore retries forever rather than
/// reporting failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub rate_limit_delay: Duration,
    pub transient_delay: Duration,
    pub page_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_delay: RATE_LIMIT_DELAY,
            transient_delay: TRANSIENT_DELAY,
            page_delay: PAGE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy for tests and dry runs.
    pub const fn no_delay() -> Self {
        Self {
            rate_limit_delay: Duration::ZERO,
            transient_delay: Duration::ZERO,
            page_delay: Duration::ZERO,
        }
    }

    /// Default delays with a caller-configured politeness delay.
    pub const fn with_page_delay(page_delay: Duration) -> Self {
        Self {
            rate_limit_delay: RATE_LIMIT_DELAY,
            transient_delay: TRANSIENT_DELAY,
            page_delay,
        }
    }
}

/// Lazy record stream over a [`PageFetcher`].
///
/// Termination: the batch is empty, OR strictly smaller than the page
/// size, OR the response carries no next cursor. The final short batch is
/// still yielded in full. Cursor state is in-memory only.
pub struct CursorStream<'a, F: PageFetcher> {
    fetcher: &'a F,
    policy: &'a RetryPolicy,
    cursor: String,
    buffer: VecDeque<Record>,
    exhausted: bool,
    started: bool,
    total_results: Option<u64>,
    entries_seen: usize,
}

impl<'a, F: PageFetcher> CursorStream<'a, F> {
    pub fn new(fetcher: &'a F, policy: &'a RetryPolicy) -> Self {
        Self {
            fetcher,
            policy,
            cursor: START_CURSOR.to_string(),
            buffer: VecDeque::new(),
            exhausted: false,
            started: false,
            total_results: None,
            entries_seen: 0,
        }
    }

    /// Total result count reported by the first page, once fetched.
    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    /// Records yielded so far (duplicates included).
    pub fn entries_seen(&self) -> usize {
        self.entries_seen
    }

    /// Fetch the page at the current cursor, retrying the same request
    /// until it succeeds.
    fn fetch_with_retry(&self) -> Page {
        loop {
            match self.fetcher.fetch_page(&self.cursor) {
                Ok(page) => return page,
                Err(e) if e.is_rate_limited() => {
                    log::warn!(
                        "rate limited, waiting {}s before retrying",
                        self.policy.rate_limit_delay.as_secs()
                    );
                    std::thread::sleep(self.policy.rate_limit_delay);
                }
                Err(e) => {
                    log::warn!(
                        "page fetch failed: {e}; retrying in {}s (cursor: {})",
                        self.policy.transient_delay.as_secs(),
                        self.cursor
                    );
                    std::thread::sleep(self.policy.transient_delay);
                }
            }
        }
    }
}

impl<F: PageFetcher> Iterator for CursorStream<'_, F> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.entries_seen += 1;
                return Some(record);
            }
            if self.exhausted {
                return None;
            }

            if self.started {
                std::thread::sleep(self.policy.page_delay);
            }
            self.started = true;

            let page = self.fetch_with_retry();
            if self.total_results.is_none() {
                self.total_results = page.total_results;
            }

            let batch_len = page.records.len();
            log::debug!("received batch of {batch_len} records");

            match page.next_cursor {
                Some(next) if batch_len > 0 && batch_len >= self.fetcher.page_size() => {
                    self.cursor = next;
                }
                _ => self.exhausted = true,
            }
            self.buffer.extend(page.records);
        }
    }
}
