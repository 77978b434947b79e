//! In-memory row client
//!
//! Serves datasets registered at runtime, honoring filters, sort, offset
//! and limit the way the remote query API does. Used by tests and demos;
//! production embedders plug their own `RowClient` against the real
//! backend.

use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::RwLock;
use ahash::AHashMap;

use rb_core::client::{
    DatasetId, FilterOp, RowClient, RowFilter, RowId, RowPayload,
    RowQueryOptions, RowWindow, SortOrder,
};

use crate::DataError;

#[derive(Debug, Clone)]
struct StoredRow {
    id: RowId,
    payload: RowPayload,
}

/// In-memory implementation of [`RowClient`]
pub struct MemoryClient {
    datasets: Arc<RwLock<AHashMap<DatasetId, Vec<StoredRow>>>>,
}

impl MemoryClient {
    /// Create a client with no datasets
    pub fn new() -> Self {
        Self {
            datasets: Arc::new(RwLock::new(AHashMap::new())),
        }
    }

    /// Register a dataset; rows are (id, payload) pairs in backend order
    pub fn insert_dataset(&self, dataset: DatasetId, rows: Vec<(RowId, RowPayload)>) {
        let rows = rows
            .into_iter()
            .map(|(id, payload)| StoredRow { id, payload })
            .collect();
        self.datasets.write().insert(dataset, rows);
    }

    /// Rows of a dataset after filters and sort, in serving order
    fn matching_rows(
        &self,
        dataset: &DatasetId,
        options: &RowQueryOptions,
    ) -> Result<Vec<StoredRow>, DataError> {
        let datasets = self.datasets.read();
        let rows = datasets
            .get(dataset)
            .ok_or_else(|| DataError::UnknownDataset(dataset.to_string()))?;

        let mut rows: Vec<StoredRow> = rows
            .iter()
            .filter(|row| options.filters.iter().all(|f| filter_matches(&row.payload, f)))
            .cloned()
            .collect();

        if let Some(field) = &options.sort_by {
            rows.sort_by(|a, b| {
                let left = field_text(&a.payload, field);
                let right = field_text(&b.payload, field);
                match options.sort_order {
                    Some(SortOrder::Descending) => right.cmp(&left),
                    _ => left.cmp(&right),
                }
            });
        }

        Ok(rows)
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowClient for MemoryClient {
    async fn fetch_rows(
        &self,
        dataset: &DatasetId,
        options: &RowQueryOptions,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<RowWindow> {
        let rows = self.matching_rows(dataset, options)?;
        let total = rows.len() as u64;
        let ids = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| row.id)
            .collect();
        Ok(RowWindow::new(ids, Some(total), limit))
    }

    async fn fetch_row(
        &self,
        dataset: &DatasetId,
        row_id: &str,
        options: &RowQueryOptions,
    ) -> anyhow::Result<RowPayload> {
        let rows = self.matching_rows(dataset, options)?;
        rows.into_iter()
            .find(|row| row.id == row_id)
            .map(|row| row.payload)
            .ok_or_else(|| DataError::RowNotFound(row_id.to_string()).into())
    }
}

/// Field value as sortable text; missing fields sort first
fn field_text(payload: &RowPayload, field: &str) -> String {
    match payload.get(field) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn filter_matches(payload: &RowPayload, filter: &RowFilter) -> bool {
    let value = payload.get(&filter.field);
    match filter.op {
        FilterOp::Exists => value.is_some(),
        FilterOp::Equals => value == Some(&filter.value),
        FilterOp::NotEqual => value != Some(&filter.value),
    }
}
