//! Windowed row-id fetching
//!
//! The fetcher asks the backend for a bounded page of row identifiers plus
//! the page after it (the lookahead used by navigation and prefetch). When
//! the selected row falls outside the fetched page, the limit doubles,
//! capped at the reported total, until the row is covered. Results of
//! superseded requests are discarded by stamp, never applied over newer
//! state.

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{debug, warn};

use rb_core::client::{DatasetId, RowClient, RowQueryOptions, RowWindow};
use rb_core::events::{EventBus, FetchFailed, WindowExpanded, WindowLoaded};
use rb_core::navigation::WindowPair;

use crate::config::BrowserConfig;
use crate::DataError;

/// Shared fetch state, written by the newest completed request only
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    /// Window the selection is expected to live in
    pub window: Option<RowWindow>,
    /// Lookahead page following the current window
    pub next_window: Option<RowWindow>,
    /// Last fetch error, cleared by the next successful fetch
    pub error: Option<String>,
}

struct FetcherInner {
    state: FetchState,
    /// Limit the next refresh will request; grows when the selection
    /// falls outside the window
    limit: usize,
    /// Stamp of the newest issued refresh
    issued: u64,
}

/// Fetches bounded pages of row ids, expanding the page size until the
/// selected row is covered
pub struct WindowFetcher {
    client: Arc<dyn RowClient>,
    events: Arc<EventBus>,
    inner: Arc<RwLock<FetcherInner>>,
    max_limit: usize,
}

impl WindowFetcher {
    /// Create a fetcher reading through the given client
    pub fn new(client: Arc<dyn RowClient>, events: Arc<EventBus>, config: &BrowserConfig) -> Self {
        Self {
            client,
            events,
            inner: Arc::new(RwLock::new(FetcherInner {
                state: FetchState::default(),
                limit: config.initial_limit.max(1),
                issued: 0,
            })),
            max_limit: config.max_limit.max(1),
        }
    }

    /// Snapshot of the current fetch state
    pub fn state(&self) -> FetchState {
        self.inner.read().state.clone()
    }

    /// Current and lookahead ids as one navigation input
    pub fn windows(&self) -> WindowPair {
        let inner = self.inner.read();
        WindowPair::from_windows(
            inner.state.window.as_ref(),
            inner.state.next_window.as_ref(),
        )
    }

    /// Limit the next refresh will request
    pub fn limit(&self) -> usize {
        self.inner.read().limit
    }

    /// Drop fetched windows and restart from the given limit, e.g. after
    /// the dataset or the query options changed
    pub fn reset(&self, limit: usize) {
        let mut inner = self.inner.write();
        inner.limit = limit.max(1);
        inner.state = FetchState::default();
    }

    /// Fetch the current and lookahead window, doubling the limit until
    /// `selection` is covered or the window cannot grow further.
    ///
    /// Returns the window pair it applied, or [`DataError::Stale`] when a
    /// newer refresh was issued while this one was in flight.
    pub async fn refresh(
        &self,
        dataset: &DatasetId,
        options: &RowQueryOptions,
        selection: Option<&str>,
    ) -> Result<WindowPair, DataError> {
        let (stamp, mut limit) = {
            let mut inner = self.inner.write();
            inner.issued += 1;
            (inner.issued, inner.limit)
        };

        loop {
            let window = match self.client.fetch_rows(dataset, options, 0, limit).await {
                Ok(window) => window,
                Err(e) => return Err(self.record_error(stamp, dataset, &e)),
            };

            // A selection missing from the page forces a wider one, as long
            // as the backend reports rows beyond what we asked for
            if let Some(target) = selection {
                if !window.contains(target) {
                    if let Some(grown) = grow_limit(limit, window.total_count, self.max_limit) {
                        debug!(%dataset, old_limit = limit, new_limit = grown, "expanding window");
                        self.events.publish(WindowExpanded {
                            dataset: dataset.clone(),
                            old_limit: limit,
                            new_limit: grown,
                        });
                        limit = grown;
                        continue;
                    }
                }
            }

            let next_window = match self.client.fetch_rows(dataset, options, limit, limit).await {
                Ok(window) => window,
                Err(e) => return Err(self.record_error(stamp, dataset, &e)),
            };

            return self.apply(stamp, dataset, limit, window, next_window);
        }
    }

    /// Write a completed fetch into shared state, unless it went stale
    fn apply(
        &self,
        stamp: u64,
        dataset: &DatasetId,
        limit: usize,
        window: RowWindow,
        next_window: RowWindow,
    ) -> Result<WindowPair, DataError> {
        let mut inner = self.inner.write();
        if stamp < inner.issued {
            debug!(%dataset, stamp, newest = inner.issued, "discarding stale window");
            return Err(DataError::Stale);
        }

        inner.limit = limit;
        let pair = WindowPair::from_windows(Some(&window), Some(&next_window));
        inner.state = FetchState {
            window: Some(window),
            next_window: Some(next_window),
            error: None,
        };
        drop(inner);

        self.events.publish(WindowLoaded {
            dataset: dataset.clone(),
            row_count: pair.current.len(),
            limit,
        });
        Ok(pair)
    }

    /// Record a failed fetch, unless a newer refresh already replaced it
    fn record_error(&self, stamp: u64, dataset: &DatasetId, error: &anyhow::Error) -> DataError {
        let mut inner = self.inner.write();
        if stamp < inner.issued {
            return DataError::Stale;
        }

        warn!(%dataset, error = %error, "row fetch failed");
        inner.state.error = Some(error.to_string());
        drop(inner);

        self.events.publish(FetchFailed {
            dataset: dataset.clone(),
            error: error.to_string(),
        });
        DataError::Fetch(error.to_string())
    }
}

/// Next limit for an uncovered selection: double, capped by the known
/// total and the configured maximum. `None` when the window cannot grow.
fn grow_limit(limit: usize, total_count: Option<u64>, max_limit: usize) -> Option<usize> {
    let total = match total_count {
        Some(total) => total as usize,
        None => return None,
    };
    if limit >= total || limit >= max_limit {
        return None;
    }
    Some(limit.saturating_mul(2).min(total).min(max_limit))
}
