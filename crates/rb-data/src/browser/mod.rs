//! Browser facade
//!
//! Wires the window fetcher, prefetcher and navigation engine together
//! around one dataset view. Fetching is async; navigation is synchronous
//! against already fetched windows and never waits on the network inside
//! a keypress.

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{debug, warn};

use rb_core::client::{DatasetId, RowClient, RowId, RowPayload, RowQueryOptions};
use rb_core::events::{EventBus, SelectionChanged};
use rb_core::navigation::{BoundaryMode, BrowserKey, NavDirection, Navigator, WindowPair};
use rb_core::selection::SelectionStore;

use crate::cache::RowCache;
use crate::config::BrowserConfig;
use crate::prefetch::Prefetcher;
use crate::window::WindowFetcher;
use crate::DataError;

/// What the browser is currently looking at
#[derive(Debug, Clone)]
struct ViewState {
    dataset: DatasetId,
    options: RowQueryOptions,
}

/// Sequential row browser over one remote dataset
///
/// The selection store stays externally reachable so embedding views can
/// read and subscribe to the current row.
pub struct RowBrowser {
    client: Arc<dyn RowClient>,
    config: BrowserConfig,
    fetcher: Arc<WindowFetcher>,
    prefetcher: Prefetcher,
    selection: Arc<SelectionStore>,
    navigator: Navigator,
    events: Arc<EventBus>,
    view: Arc<RwLock<Option<ViewState>>>,
}

impl RowBrowser {
    /// Create a browser reading through the given client
    pub fn new(client: Arc<dyn RowClient>, config: BrowserConfig) -> Self {
        let events = Arc::new(EventBus::new());
        let selection = Arc::new(SelectionStore::new());
        let cache = Arc::new(RowCache::new(config.cache_capacity));
        let fetcher = Arc::new(WindowFetcher::new(client.clone(), events.clone(), &config));
        let prefetcher = Prefetcher::new(client.clone(), cache);
        let navigator = Navigator::new(selection.clone());

        Self {
            client,
            config,
            fetcher,
            prefetcher,
            selection,
            navigator,
            events,
            view: Arc::new(RwLock::new(None)),
        }
    }

    /// Use a different boundary behavior (the default is `Clamp`)
    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.navigator = self.navigator.with_boundary(boundary);
        self
    }

    /// The externally-owned selection store
    pub fn selection(&self) -> &Arc<SelectionStore> {
        &self.selection
    }

    /// Event bus carrying window loads, expansions and fetch failures
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Prefetched payload cache
    pub fn cache(&self) -> &Arc<RowCache> {
        self.prefetcher.cache()
    }

    /// The window fetcher backing this browser
    pub fn fetcher(&self) -> &Arc<WindowFetcher> {
        &self.fetcher
    }

    /// Open a dataset: fetch its first window pair, select the first row
    /// when nothing is selected yet, and prefetch payloads
    pub async fn open(
        &self,
        dataset: DatasetId,
        options: RowQueryOptions,
    ) -> Result<(), DataError> {
        self.fetcher.reset(self.config.initial_limit);
        *self.view.write() = Some(ViewState { dataset, options });
        self.refresh().await
    }

    /// Re-fetch the window pair for the current view, expanding until the
    /// selection is covered, then prefetch payloads
    pub async fn refresh(&self) -> Result<(), DataError> {
        let view = match self.view.read().clone() {
            Some(view) => view,
            None => return Ok(()),
        };

        let selection = self.selection.get();
        let pair = self
            .fetcher
            .refresh(&view.dataset, &view.options, selection.as_deref())
            .await?;

        if self.config.prefetch {
            self.prefetcher.spawn_prefetch(
                view.dataset.clone(),
                view.options.clone(),
                prefetch_ids(&pair),
            );
        }

        // A fresh view starts on the first row
        if selection.is_none() {
            if let Some(first) = pair.current.first() {
                self.selection.set(first.clone());
                self.events.publish(SelectionChanged {
                    row_id: Some(first.clone()),
                });
            }
        }

        Ok(())
    }

    /// Synchronous navigation step.
    ///
    /// Returns the row the step landed on, `None` for a no-op. When the
    /// resolved row lies outside the fetched window, a background refresh
    /// rolls the window forward; the keypress itself never waits.
    pub fn navigate(&self, direction: NavDirection) -> Option<RowId> {
        let windows = self.fetcher.windows();
        let resolved = self.navigator.navigate(&windows, direction)?;
        self.events.publish(SelectionChanged {
            row_id: Some(resolved.clone()),
        });

        if !windows.current.iter().any(|id| id == &resolved) {
            debug!(row_id = %resolved, "selection left the window");
            self.spawn_refresh();
        }
        Some(resolved)
    }

    /// Keyboard entry point: left arrow steps back, right arrow forward
    pub fn handle_key(&self, key: BrowserKey) -> Option<RowId> {
        self.navigate(key.direction())
    }

    /// Payload of the selected row, served from the prefetch cache when warm
    pub async fn current_row(&self) -> Result<Option<RowPayload>, DataError> {
        let row_id = match self.selection.get() {
            Some(row_id) => row_id,
            None => return Ok(None),
        };
        let view = match self.view.read().clone() {
            Some(view) => view,
            None => return Ok(None),
        };

        if let Some(payload) = self.prefetcher.cache().get(&row_id) {
            return Ok(Some(payload));
        }

        let payload = self
            .client
            .fetch_row(&view.dataset, &row_id, &view.options)
            .await
            .map_err(DataError::from)?;
        self.prefetcher.cache().put(row_id, payload.clone());
        Ok(Some(payload))
    }

    /// Refresh in the background after navigation outran the window
    fn spawn_refresh(&self) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no runtime available for background refresh");
                return;
            }
        };
        let view = match self.view.read().clone() {
            Some(view) => view,
            None => return,
        };

        let fetcher = self.fetcher.clone();
        let selection = self.selection.clone();
        let prefetcher = self.prefetcher.clone();
        let prefetch = self.config.prefetch;

        handle.spawn(async move {
            let selected = selection.get();
            match fetcher
                .refresh(&view.dataset, &view.options, selected.as_deref())
                .await
            {
                Ok(pair) => {
                    if prefetch {
                        prefetcher
                            .prefetch(&view.dataset, &view.options, &prefetch_ids(&pair))
                            .await;
                    }
                }
                Err(DataError::Stale) => {}
                Err(e) => warn!(error = %e, "background refresh failed"),
            }
        });
    }
}

/// Ids worth prefetching for a window pair: current page plus lookahead
fn prefetch_ids(pair: &WindowPair) -> Vec<RowId> {
    pair.current.iter().chain(pair.next.iter()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::clients::MemoryClient;

    fn dataset() -> DatasetId {
        DatasetId::new("local".to_string(), "reviews".to_string())
    }

    fn browser_with_rows(count: usize, initial_limit: usize) -> RowBrowser {
        let client = MemoryClient::new();
        let rows = (0..count)
            .map(|i| (format!("r{i}"), json!({ "text": format!("row {i}") })))
            .collect();
        client.insert_dataset(dataset(), rows);

        let config = BrowserConfig {
            initial_limit,
            ..BrowserConfig::default()
        };
        RowBrowser::new(Arc::new(client), config)
    }

    #[tokio::test]
    async fn test_open_selects_first_row() {
        let browser = browser_with_rows(12, 5);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();

        assert_eq!(browser.selection().get(), Some("r0".to_string()));
        assert_eq!(browser.fetcher().windows().current.len(), 5);
    }

    #[tokio::test]
    async fn test_arrow_keys_step_through_rows() {
        let browser = browser_with_rows(12, 5);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();

        assert_eq!(browser.handle_key(BrowserKey::ArrowRight), Some("r1".to_string()));
        assert_eq!(browser.handle_key(BrowserKey::ArrowLeft), Some("r0".to_string()));
        // At the first row the left arrow clamps
        assert_eq!(browser.handle_key(BrowserKey::ArrowLeft), None);
        assert_eq!(browser.selection().get(), Some("r0".to_string()));
    }

    #[tokio::test]
    async fn test_next_past_window_uses_lookahead_then_expands() {
        let browser = browser_with_rows(30, 5);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();

        for expected in ["r1", "r2", "r3", "r4"] {
            assert_eq!(browser.navigate(NavDirection::Next), Some(expected.to_string()));
        }

        // Past the window end: the lookahead page resolves the step
        assert_eq!(browser.navigate(NavDirection::Next), Some("r5".to_string()));
        assert_eq!(browser.selection().get(), Some("r5".to_string()));

        // The follow-up refresh widens the window until r5 is covered
        browser.refresh().await.unwrap();
        assert!(browser.fetcher().windows().current.iter().any(|id| id == "r5"));
        assert_eq!(browser.fetcher().limit(), 10);
    }

    #[tokio::test]
    async fn test_wrap_mode_cycles() {
        let client = MemoryClient::new();
        client.insert_dataset(
            dataset(),
            vec![
                ("r0".to_string(), json!({})),
                ("r1".to_string(), json!({})),
                ("r2".to_string(), json!({})),
            ],
        );
        let browser = RowBrowser::new(Arc::new(client), BrowserConfig::default())
            .with_boundary(BoundaryMode::Wrap);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();

        assert_eq!(browser.navigate(NavDirection::Previous), Some("r2".to_string()));
        assert_eq!(browser.navigate(NavDirection::Next), Some("r0".to_string()));
    }

    #[tokio::test]
    async fn test_navigate_before_open_is_noop() {
        let browser = browser_with_rows(3, 5);

        assert_eq!(browser.navigate(NavDirection::Next), None);
        assert_eq!(browser.selection().get(), None);
    }

    #[tokio::test]
    async fn test_current_row_fills_cache_on_miss() {
        let browser = browser_with_rows(3, 5);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();
        browser.cache().clear();

        let payload = browser.current_row().await.unwrap().unwrap();
        assert_eq!(payload["text"], "row 0");
        assert!(browser.cache().get("r0").is_some());
    }

    #[tokio::test]
    async fn test_selection_survives_refresh() {
        let browser = browser_with_rows(12, 5);
        browser.open(dataset(), RowQueryOptions::default()).await.unwrap();
        browser.navigate(NavDirection::Next);

        browser.refresh().await.unwrap();
        assert_eq!(browser.selection().get(), Some("r1".to_string()));
    }
}
