//! Client contract to the remote dataset query API

use async_trait::async_trait;
use serde::{Serialize, Deserialize};

/// Row identifier type
pub type RowId = String;

/// Full row content as served by the backend
pub type RowPayload = serde_json::Value;

/// Identifies one dataset on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId {
    pub namespace: String,
    pub name: String,
}

impl DatasetId {
    /// Create a dataset id from a namespace and a dataset name
    pub fn new(namespace: String, name: String) -> Self {
        Self { namespace, name }
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Comparison operator of a row filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    Equals,
    NotEqual,
    Exists,
}

/// A single filter, forwarded verbatim to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Field of the row payload the filter applies to
    pub field: String,
    pub op: FilterOp,
    pub value: serde_json::Value,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filter and sort options forwarded to the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowQueryOptions {
    pub filters: Vec<RowFilter>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

/// A bounded, ordered page of row identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWindow {
    /// Row ids in backend order
    pub ids: Vec<RowId>,
    /// Total rows matching the query, if the backend knows it
    pub total_count: Option<u64>,
    /// How many ids were requested
    pub limit: usize,
}

impl RowWindow {
    /// Create a window, truncating `ids` to the requested limit
    pub fn new(mut ids: Vec<RowId>, total_count: Option<u64>, limit: usize) -> Self {
        ids.truncate(limit);
        Self { ids, total_count, limit }
    }

    /// An empty window for the given limit
    pub fn empty(limit: usize) -> Self {
        Self { ids: Vec::new(), total_count: None, limit }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the window holds the given row id
    pub fn contains(&self, row_id: &str) -> bool {
        self.ids.iter().any(|id| id == row_id)
    }
}

/// Trait for remote row query backends
///
/// The backend owns retry policy and caching of its reads; implementations
/// here only report success or failure of a single request.
#[async_trait]
pub trait RowClient: Send + Sync {
    /// Fetch a page of row identifiers matching the query options
    async fn fetch_rows(
        &self,
        dataset: &DatasetId,
        options: &RowQueryOptions,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<RowWindow>;

    /// Fetch the full payload of a single row
    async fn fetch_row(
        &self,
        dataset: &DatasetId,
        row_id: &str,
        options: &RowQueryOptions,
    ) -> anyhow::Result<RowPayload>;
}
