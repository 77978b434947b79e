use serde::{Serialize, Deserialize};

mod engine;
mod locator;

pub use engine::{Navigator, WindowPair};
pub use locator::locate;

/// Direction of a sequential navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Behavior at the edges of the fetched window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Stop at the first and last reachable row (windowed browsing)
    #[default]
    Clamp,
    /// Cycle around inside the fetched window (single-item carousel)
    Wrap,
}

/// Keyboard keys the browser reacts to
///
/// Deciding when keys reach the browser (e.g. not while focus sits in a
/// text input) is the embedding UI's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKey {
    ArrowLeft,
    ArrowRight,
}

impl BrowserKey {
    /// Navigation direction bound to this key
    pub fn direction(self) -> NavDirection {
        match self {
            BrowserKey::ArrowLeft => NavDirection::Previous,
            BrowserKey::ArrowRight => NavDirection::Next,
        }
    }
}
