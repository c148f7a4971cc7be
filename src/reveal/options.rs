//! Reveal-set options.

use serde::Deserialize;

use super::watcher::ThresholdConfig;
use crate::types::{Millis, RootMargin};

/// Default share of an element that must be on screen before it counts.
pub const DEFAULT_VISIBLE_FRACTION: f32 = 0.1;

/// Default gap between consecutive items of a staggered set.
pub const DEFAULT_PER_ITEM_DELAY_MS: Millis = 100;

/// Default root margin: the bottom 50px of the viewport do not count.
pub const DEFAULT_ROOT_MARGIN: RootMargin = RootMargin::px(0.0, 0.0, -50.0, 0.0);

/// How a reveal set is observed and staggered.
///
/// Deserializes from page configuration; missing fields take the defaults.
///
/// ```ignore
/// let opts: RevealOptions = serde_json::from_str(
///     r#"{ "per_item_delay_ms": 200, "root_margin": "0px 0px -100px 0px" }"#,
/// )?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Delay before the first item, measured from the moment the set is seen.
    pub base_delay_ms: Millis,
    /// Added per item index.
    pub per_item_delay_ms: Millis,
    /// Clamped to `0.0..=1.0` when used.
    pub visible_fraction: f32,
    pub root_margin: RootMargin,
}

impl RevealOptions {
    pub fn with_delays(base_delay_ms: Millis, per_item_delay_ms: Millis) -> Self {
        Self {
            base_delay_ms,
            per_item_delay_ms,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, visible_fraction: f32, root_margin: RootMargin) -> Self {
        self.visible_fraction = visible_fraction;
        self.root_margin = root_margin;
        self
    }

    /// Watcher configuration for the set's anchor.
    pub fn threshold(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.visible_fraction, self.root_margin)
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            base_delay_ms: 0,
            per_item_delay_ms: DEFAULT_PER_ITEM_DELAY_MS,
            visible_fraction: DEFAULT_VISIBLE_FRACTION,
            root_margin: DEFAULT_ROOT_MARGIN,
        }
    }
}
