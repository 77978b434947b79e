//! Fetch machinery for the sequential row browser
//!
//! Windowed row-id fetching with self-expanding limits, speculative
//! payload prefetch, and the browser facade tying both to the navigation
//! engine in `rb-core`.

pub mod browser;
pub mod cache;
pub mod clients;
pub mod config;
pub mod prefetch;
pub mod window;

use thiserror::Error;

// Re-exports
pub use browser::RowBrowser;
pub use cache::RowCache;
pub use clients::MemoryClient;
pub use config::BrowserConfig;
pub use prefetch::Prefetcher;
pub use window::{FetchState, WindowFetcher};

/// Errors that can occur in fetch operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Request superseded by a newer one")]
    Stale,

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for DataError {
    fn from(error: anyhow::Error) -> Self {
        DataError::Fetch(error.to_string())
    }
}
