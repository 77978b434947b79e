//! Browser lifecycle events
//!
//! Fetch errors and window loads surface here in addition to the fetcher's
//! own state, so embedding views can show error and loading indicators
//! without polling.

use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

use crate::client::{DatasetId, RowId};

/// Event trait that all browser events implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// A window of row ids finished loading
#[derive(Debug, Clone)]
pub struct WindowLoaded {
    pub dataset: DatasetId,
    pub row_count: usize,
    pub limit: usize,
}

/// The fetch limit grew to cover a selection outside the window
#[derive(Debug, Clone)]
pub struct WindowExpanded {
    pub dataset: DatasetId,
    pub old_limit: usize,
    pub new_limit: usize,
}

/// A backend read failed
#[derive(Debug, Clone)]
pub struct FetchFailed {
    pub dataset: DatasetId,
    pub error: String,
}

/// The selected row changed
#[derive(Debug, Clone)]
pub struct SelectionChanged {
    pub row_id: Option<RowId>,
}

macro_rules! impl_event {
    ($($t:ty),* $(,)?) => {
        $(
            impl Event for $t {
                fn as_any(&self) -> &dyn std::any::Any {
                    self
                }
            }
        )*
    };
}

impl_event!(WindowLoaded, WindowExpanded, FetchFailed, SelectionChanged);

/// Type-indexed event bus
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        self.handlers.lock().entry(type_id).or_default().push(handler);
    }

    /// Publish an event to its subscribers
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    struct ClosureHandler<F>(F);

    impl<F> EventHandler for ClosureHandler<F>
    where
        F: FnMut(&dyn Event) + Send + Sync,
    {
        fn handle(&mut self, event: &dyn Event) {
            (self.0)(event);
        }
    }

    Box::new(ClosureHandler(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> DatasetId {
        DatasetId::new("local".to_string(), "reviews".to_string())
    }

    #[test]
    fn test_publish_reaches_matching_subscribers() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<FetchFailed>(handler_from_fn(move |event| {
            if let Some(failed) = event.as_any().downcast_ref::<FetchFailed>() {
                sink.lock().push(failed.error.clone());
            }
        }));

        bus.publish(FetchFailed {
            dataset: dataset(),
            error: "boom".to_string(),
        });
        // Different event type, must not reach the FetchFailed handler
        bus.publish(WindowLoaded {
            dataset: dataset(),
            row_count: 5,
            limit: 10,
        });

        assert_eq!(*seen.lock(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(SelectionChanged { row_id: None });
    }
}
