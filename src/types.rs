//! Core types for reveal-kit.
//!
//! Element handles, layout geometry, root margins and host capabilities.
//! Everything else in the crate is built on these.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

// =============================================================================
// Time
// =============================================================================

/// Milliseconds on the host clock.
pub type Millis = u64;

// =============================================================================
// Element handle
// =============================================================================

/// Opaque, stable handle to a page element.
///
/// Handles are never reused while a document is alive, so a handle that
/// outlives its element simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap with `other`, edge-inclusive.
    ///
    /// Returns `None` when the rectangles are disjoint. Touching edges yield a
    /// zero-area rectangle, the same way the browser reports adjacency.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of this rectangle visible inside `root`, in `0.0..=1.0`.
    ///
    /// A zero-area rectangle counts as fully visible when it touches `root`.
    pub fn visible_fraction(&self, root: &Rect) -> f32 {
        let Some(overlap) = self.intersection(root) else {
            return 0.0;
        };
        let area = self.area();
        if area <= 0.0 {
            return 1.0;
        }
        (overlap.area() / area).clamp(0.0, 1.0)
    }
}

// =============================================================================
// Root margin
// =============================================================================

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f32),
    /// Percent of the root's height (top/bottom) or width (left/right).
    Percent(f32),
}

impl MarginValue {
    /// Resolve against the root's extent along the same axis.
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }

    fn parse(raw: &str) -> Result<Self, RootMarginError> {
        let invalid = || RootMarginError::InvalidValue(raw.to_string());
        if let Some(num) = raw.strip_suffix("px") {
            let value: f32 = num.parse().map_err(|_| invalid())?;
            return finite(value).map(MarginValue::Px).ok_or_else(invalid);
        }
        if let Some(num) = raw.strip_suffix('%') {
            let value: f32 = num.parse().map_err(|_| invalid())?;
            return finite(value).map(MarginValue::Percent).ok_or_else(invalid);
        }
        // Unitless zero is the only bare number CSS accepts here.
        match raw.parse::<f32>() {
            Ok(value) if value == 0.0 => Ok(MarginValue::Px(0.0)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Px(px) => write!(f, "{px}px"),
            MarginValue::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

/// Error returned when a root margin string cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RootMarginError {
    #[error("root margin needs 1 to 4 values, got {0}")]
    WrongArity(usize),
    #[error("invalid root margin value `{0}` (expected px or %)")]
    InvalidValue(String),
}

/// Grows (positive) or shrinks (negative) the viewport before intersection
/// is computed. Same shorthand as the CSS `margin` property.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub const ZERO: Self = Self::px(0.0, 0.0, 0.0, 0.0);

    pub const fn px(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: MarginValue::Px(top),
            right: MarginValue::Px(right),
            bottom: MarginValue::Px(bottom),
            left: MarginValue::Px(left),
        }
    }

    /// Apply the margin to `root`.
    pub fn expand(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let values = raw
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            other => return Err(RootMarginError::WrongArity(other.len())),
        };
        Ok(Self { top, right, bottom, left })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = RootMarginError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

// =============================================================================
// Host capabilities
// =============================================================================

bitflags::bitflags! {
    /// What the host runtime can do.
    ///
    /// Checked explicitly instead of probing for methods at call time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HostCapabilities: u8 {
        /// Viewport-intersection notifications are available.
        const VISIBILITY_OBSERVER = 1 << 0;
        /// `scrollTo` honours smooth behaviour.
        const SMOOTH_SCROLL = 1 << 1;
        /// Images support native lazy loading.
        const NATIVE_LAZY_LOADING = 1 << 2;
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

// =============================================================================
// Tests
// =============================================================================
