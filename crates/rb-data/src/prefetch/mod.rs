//! Speculative row payload prefetch
//!
//! Fetches full payloads for the current and lookahead window before the
//! user navigates there, so stepping forward is served from the cache.
//! Reads are fire-and-forget: completion order is unconstrained and a
//! failed read only costs a cache miss later.

use std::sync::Arc;
use tracing::{debug, warn};

use rb_core::client::{DatasetId, RowClient, RowId, RowQueryOptions};

use crate::cache::RowCache;

/// Issues speculative payload reads into the shared cache
#[derive(Clone)]
pub struct Prefetcher {
    client: Arc<dyn RowClient>,
    cache: Arc<RowCache>,
}

impl Prefetcher {
    pub fn new(client: Arc<dyn RowClient>, cache: Arc<RowCache>) -> Self {
        Self { client, cache }
    }

    /// The cache prefetched payloads land in
    pub fn cache(&self) -> &Arc<RowCache> {
        &self.cache
    }

    /// Fetch every id not yet cached, concurrently, and wait for the set
    /// to settle. Individual failures are logged and skipped.
    pub async fn prefetch(&self, dataset: &DatasetId, options: &RowQueryOptions, ids: &[RowId]) {
        let mut handles = Vec::new();

        for id in ids {
            if self.cache.get(id).is_some() {
                continue;
            }

            let client = self.client.clone();
            let cache = self.cache.clone();
            let dataset = dataset.clone();
            let options = options.clone();
            let id = id.clone();

            handles.push(tokio::spawn(async move {
                match client.fetch_row(&dataset, &id, &options).await {
                    Ok(payload) => cache.put(id, payload),
                    Err(e) => debug!(row_id = %id, error = %e, "prefetch failed"),
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Fire-and-forget variant used on the navigation path
    pub fn spawn_prefetch(&self, dataset: DatasetId, options: RowQueryOptions, ids: Vec<RowId>) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no runtime available for prefetch");
                return;
            }
        };

        let prefetcher = self.clone();
        handle.spawn(async move {
            prefetcher.prefetch(&dataset, &options, &ids).await;
        });
    }
}
