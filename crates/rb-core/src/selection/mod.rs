//! Shared selection state
//!
//! The selection is owned here, outside the fetch machinery: window
//! refreshes come and go while the selected row id stays put. The
//! navigation engine proposes new values through [`SelectionStore::set`];
//! views observe changes through explicit subscriptions.

use std::sync::{Arc, Weak};
use parking_lot::RwLock;

use crate::client::RowId;

/// Trait for components that need to respond to selection changes
pub trait SelectionSubscriber: Send + Sync {
    /// Called after the selected row changes
    fn on_selection_change(&self, selected: Option<&RowId>);
}

/// The externally-owned "current row" store
pub struct SelectionStore {
    current: Arc<RwLock<Option<RowId>>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn SelectionSubscriber>>>>,
}

impl SelectionStore {
    /// Create an empty selection store
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Currently selected row id, if any
    pub fn get(&self) -> Option<RowId> {
        self.current.read().clone()
    }

    /// Replace the selection and notify subscribers
    pub fn set(&self, row_id: RowId) {
        *self.current.write() = Some(row_id);
        self.notify_subscribers();
    }

    /// Clear the selection and notify subscribers
    pub fn clear(&self) {
        *self.current.write() = None;
        self.notify_subscribers();
    }

    /// Add a subscriber
    pub fn subscribe(&self, subscriber: Arc<dyn SelectionSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    /// Notify all live subscribers of the current selection
    fn notify_subscribers(&self) {
        let current = self.get();
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_selection_change(current.as_ref());
            }
        }
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder {
        seen: Mutex<Vec<Option<RowId>>>,
    }

    impl SelectionSubscriber for Recorder {
        fn on_selection_change(&self, selected: Option<&RowId>) {
            self.seen.lock().push(selected.cloned());
        }
    }

    #[test]
    fn test_set_and_get() {
        let store = SelectionStore::new();
        assert_eq!(store.get(), None);

        store.set("r1".to_string());
        assert_eq!(store.get(), Some("r1".to_string()));

        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_subscribers_notified() {
        let store = SelectionStore::new();
        let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
        store.subscribe(recorder.clone());

        store.set("r1".to_string());
        store.set("r2".to_string());
        store.clear();

        let seen = recorder.seen.lock();
        assert_eq!(
            *seen,
            vec![Some("r1".to_string()), Some("r2".to_string()), None]
        );
    }

    #[test]
    fn test_dead_subscribers_dropped() {
        let store = SelectionStore::new();
        let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
        store.subscribe(recorder.clone());
        drop(recorder);

        // Must not panic or leak notifications to the dropped subscriber
        store.set("r1".to_string());
        assert_eq!(store.get(), Some("r1".to_string()));
    }
}
