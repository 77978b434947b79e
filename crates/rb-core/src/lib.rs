//! Core abstractions for the sequential row browser
//!
//! This crate provides the data model and client contract for the remote
//! query API, the row locator and navigation engine, the shared selection
//! store, and the event bus used to surface load and error events.

pub mod client;
pub mod events;
pub mod navigation;
pub mod selection;

// Re-export commonly used types
pub use client::{
    DatasetId, FilterOp, RowClient, RowFilter, RowId, RowPayload,
    RowQueryOptions, RowWindow, SortOrder,
};
pub use events::EventBus;
pub use navigation::{
    locate, BoundaryMode, BrowserKey, NavDirection, Navigator, WindowPair,
};
pub use selection::{SelectionStore, SelectionSubscriber};
