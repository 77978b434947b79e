//! Navigation engine
//!
//! Computes the row a previous/next step lands on and writes the result to
//! the shared selection store. Steps are synchronous against already
//! fetched windows: when the data for a step is not there yet, the step is
//! a no-op rather than a wait.

use std::sync::Arc;
use tracing::debug;

use super::{locate, BoundaryMode, NavDirection};
use crate::client::{RowId, RowWindow};
use crate::selection::SelectionStore;

/// The current window and its lookahead, as one navigation input
#[derive(Debug, Clone, Default)]
pub struct WindowPair {
    /// Window the selection is expected to live in
    pub current: Vec<RowId>,
    /// The page immediately following the current window
    pub next: Vec<RowId>,
}

impl WindowPair {
    pub fn new(current: Vec<RowId>, next: Vec<RowId>) -> Self {
        Self { current, next }
    }

    /// Build from fetched windows; missing windows count as empty
    pub fn from_windows(current: Option<&RowWindow>, next: Option<&RowWindow>) -> Self {
        Self {
            current: current.map(|w| w.ids.clone()).unwrap_or_default(),
            next: next.map(|w| w.ids.clone()).unwrap_or_default(),
        }
    }
}

/// Resolves previous/next rows and applies them to the selection store
pub struct Navigator {
    selection: Arc<SelectionStore>,
    boundary: BoundaryMode,
}

impl Navigator {
    /// Create a navigator writing to the given selection store
    pub fn new(selection: Arc<SelectionStore>) -> Self {
        Self {
            selection,
            boundary: BoundaryMode::default(),
        }
    }

    /// Use a different boundary behavior
    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Resolve the row a step would land on, without applying it.
    ///
    /// Returns `None` when the step is a no-op: nothing selected, selection
    /// not found in the window, or an edge reached under `Clamp`.
    pub fn resolve(&self, windows: &WindowPair, direction: NavDirection) -> Option<RowId> {
        let selected = self.selection.get();
        let index = locate(&windows.current, selected.as_deref())?;

        match direction {
            NavDirection::Previous => self.resolve_previous(windows, index),
            NavDirection::Next => self.resolve_next(windows, index),
        }
    }

    /// Perform a step: resolve it and, when it lands on a row, write that
    /// row to the selection store.
    pub fn navigate(&self, windows: &WindowPair, direction: NavDirection) -> Option<RowId> {
        let resolved = self.resolve(windows, direction)?;
        debug!(row_id = %resolved, ?direction, "navigating");
        self.selection.set(resolved.clone());
        Some(resolved)
    }

    fn resolve_previous(&self, windows: &WindowPair, index: usize) -> Option<RowId> {
        if index == 0 {
            return match self.boundary {
                BoundaryMode::Clamp => None,
                BoundaryMode::Wrap => windows.current.last().cloned(),
            };
        }
        windows.current.get(index - 1).cloned()
    }

    fn resolve_next(&self, windows: &WindowPair, index: usize) -> Option<RowId> {
        let target = index + 1;
        if target < windows.current.len() {
            return windows.current.get(target).cloned();
        }

        // Past the fetched window: fall through to the lookahead page,
        // which the prefetcher already covers
        let overflow = target - windows.current.len();
        if let Some(id) = windows.next.get(overflow) {
            return Some(id.clone());
        }

        match self.boundary {
            BoundaryMode::Clamp => None,
            BoundaryMode::Wrap => windows.current.first().cloned(),
        }
    }
}
