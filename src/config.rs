//! Page configuration.
//!
//! Everything the page wiring needs to know about a particular invitation
//! page: which reveal sets exist and the tuning constants for navigation,
//! parallax and form submission. Loaded from JSON; every field is optional.
//!
//! ```json
//! {
//!   "reveal_sets": [
//!     { "id": "gallery", "root": ".gallery-section", "items": ".gallery-item",
//!       "options": { "per_item_delay_ms": 120 } }
//!   ],
//!   "scroll_throttle_ms": 16
//! }
//! ```

use serde::Deserialize;

use crate::reveal::RevealOptions;
use crate::types::{Millis, RootMargin};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid page configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reveal set #{index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },
}

/// One reveal set declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RevealSetConfig {
    pub id: String,
    /// Selector for the anchor; the first match is used.
    pub root: String,
    /// Selector for the staggered items, searched inside the anchor.
    pub items: String,
    /// Falls back to [`PageConfig::reveal_defaults`].
    #[serde(default)]
    pub options: Option<RevealOptions>,
}

impl RevealSetConfig {
    pub fn new(id: &str, root: &str, items: &str) -> Self {
        Self {
            id: id.to_string(),
            root: root.to_string(),
            items: items.to_string(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: RevealOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub reveal_defaults: RevealOptions,
    pub reveal_sets: Vec<RevealSetConfig>,
    /// Class the apply callback adds to revealed items.
    pub visible_class: String,
    /// Height of the fixed navbar, subtracted from smooth-scroll targets.
    pub nav_offset_px: f32,
    /// Look-ahead used when picking the active navigation link.
    pub active_link_offset_px: f32,
    /// Scroll depth after which the navbar switches to its solid style.
    pub navbar_solid_after_px: f32,
    /// Hero image moves at this fraction of the scroll speed.
    pub hero_parallax_speed: f32,
    pub scroll_throttle_ms: Millis,
    pub resize_debounce_ms: Millis,
    /// Duration of the mocked RSVP submission.
    pub submit_delay_ms: Millis,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            reveal_defaults: RevealOptions::default(),
            reveal_sets: vec![
                RevealSetConfig::new("about", ".about-section", ".about-person"),
                RevealSetConfig::new("gallery", ".gallery-section", ".gallery-item")
                    .with_options(RevealOptions::with_delays(0, 100)),
                RevealSetConfig::new("details", ".details-section", ".detail-card")
                    .with_options(RevealOptions::with_delays(0, 150)),
                RevealSetConfig::new("timeline", ".schedule-section", ".timeline-item").with_options(
                    RevealOptions::with_delays(0, 200)
                        .with_threshold(0.2, RootMargin::px(0.0, 0.0, -100.0, 0.0)),
                ),
            ],
            visible_class: "visible".to_string(),
            nav_offset_px: 70.0,
            active_link_offset_px: 100.0,
            navbar_solid_after_px: 100.0,
            hero_parallax_speed: 0.5,
            scroll_throttle_ms: 16,
            resize_debounce_ms: 250,
            submit_delay_ms: 1_500,
        }
    }
}

impl PageConfig {
    /// Parse and sanitize a JSON configuration.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config.sanitized())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, set) in self.reveal_sets.iter().enumerate() {
            for (field, value) in [("id", &set.id), ("root", &set.root), ("items", &set.items)] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptyField { index, field });
                }
            }
        }
        Ok(())
    }

    /// Clamp numbers into usable ranges instead of rejecting the page.
    pub fn sanitized(mut self) -> Self {
        let speed = self.hero_parallax_speed;
        self.hero_parallax_speed = if speed.is_finite() { speed.clamp(0.0, 1.0) } else { 0.0 };
        if self.hero_parallax_speed != speed {
            tracing::warn!(requested = speed, used = self.hero_parallax_speed, "parallax speed clamped");
        }
        for px in [
            &mut self.nav_offset_px,
            &mut self.active_link_offset_px,
            &mut self.navbar_solid_after_px,
        ] {
            if !px.is_finite() || *px < 0.0 {
                tracing::warn!(requested = *px, "negative offset replaced by 0");
                *px = 0.0;
            }
        }
        if self.visible_class.trim().is_empty() {
            self.visible_class = "visible".to_string();
        }
        self
    }

    /// Options for a declared set, falling back to the page defaults.
    pub fn options_for(&self, set: &RevealSetConfig) -> RevealOptions {
        set.options.unwrap_or(self.reveal_defaults)
    }
}
