//! Page events - what the host feeds into the page wiring.

use crate::types::ElementId;

/// Keyboard event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "Escape")
    pub key: String,
}

impl KeyboardEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }
}

/// Discrete browser events the page reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// Vertical scroll position changed.
    Scroll { y: f32 },
    /// Viewport size changed.
    Resize { width: f32, height: f32 },
    Click { target: ElementId },
    Key(KeyboardEvent),
    Focus { target: ElementId },
    Blur { target: ElementId },
    /// The RSVP form was submitted.
    Submit,
    /// An image finished loading (or was already cached).
    ImageLoaded { target: ElementId },
    /// An image failed to load.
    ImageFailed { target: ElementId },
}
