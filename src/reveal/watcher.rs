//! Threshold Watcher - one-shot viewport-entry notifications.
//!
//! Each [`ThresholdWatcher::observe`] call creates a subscription that fires
//! its `on_enter` callback at most once: the first time a recompute finds
//! the element intersecting the (margin-adjusted) viewport with at least the
//! configured visible fraction. The subscription then retires itself.
//!
//! # Fallback
//!
//! When the host lacks [`HostCapabilities::VISIBILITY_OBSERVER`], `observe`
//! fires `on_enter` synchronously and returns a retired subscription. No
//! element is ever left waiting on a primitive that does not exist.
//!
//! # Delivery
//!
//! [`ThresholdWatcher::recompute`] only measures. It returns an
//! [`EnterBatch`] whose callbacks run on [`EnterBatch::deliver`], so the
//! caller can release its hold on the document before callbacks mutate it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::Document;
use crate::types::{ElementId, HostCapabilities, Rect, RootMargin};

// =============================================================================
// CONFIG
// =============================================================================

/// Visibility threshold for one subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    visible_fraction: f32,
    pub root_margin: RootMargin,
}

impl ThresholdConfig {
    /// Out-of-range fractions are clamped to `0.0..=1.0` (NaN becomes 0).
    pub fn new(visible_fraction: f32, root_margin: RootMargin) -> Self {
        let clamped = if visible_fraction.is_nan() {
            0.0
        } else {
            visible_fraction.clamp(0.0, 1.0)
        };
        if clamped != visible_fraction {
            tracing::warn!(requested = visible_fraction, used = clamped, "visible fraction clamped");
        }
        Self { visible_fraction: clamped, root_margin }
    }

    pub fn visible_fraction(&self) -> f32 {
        self.visible_fraction
    }

    /// Whether an element at `rect` counts as entered for `viewport`.
    pub fn is_entered(&self, rect: &Rect, viewport: &Rect) -> bool {
        let root = self.root_margin.expand(viewport);
        rect.intersection(&root).is_some() && rect.visible_fraction(&root) >= self.visible_fraction
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Handle for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type EnterFn = Box<dyn FnOnce(ElementId)>;

struct Observation {
    element: ElementId,
    config: ThresholdConfig,
    on_enter: EnterFn,
}

struct WatcherState {
    /// Keyed by subscription id, so delivery follows observation order.
    observations: BTreeMap<u64, Observation>,
    next_id: u64,
}

/// Entries found by a recompute, not yet delivered.
#[must_use = "entries only reach their callbacks once delivered"]
pub struct EnterBatch {
    entries: Vec<(ElementId, EnterFn)>,
}

impl EnterBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Elements in delivery order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.entries.iter().map(|(el, _)| *el).collect()
    }

    /// Run every `on_enter` callback. Returns how many ran.
    pub fn deliver(self) -> usize {
        let count = self.entries.len();
        for (element, on_enter) in self.entries {
            on_enter(element);
        }
        count
    }
}

// =============================================================================
// WATCHER
// =============================================================================

#[derive(Clone)]
pub struct ThresholdWatcher {
    capabilities: HostCapabilities,
    state: Rc<RefCell<WatcherState>>,
}

impl ThresholdWatcher {
    pub fn new(capabilities: HostCapabilities) -> Self {
        Self {
            capabilities,
            state: Rc::new(RefCell::new(WatcherState {
                observations: BTreeMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Whether real observation is available (otherwise: degrade to visible).
    pub fn is_supported(&self) -> bool {
        self.capabilities.contains(HostCapabilities::VISIBILITY_OBSERVER)
    }

    /// Watch `element` until it enters; then call `on_enter` once.
    pub fn observe(
        &self,
        element: ElementId,
        config: ThresholdConfig,
        on_enter: impl FnOnce(ElementId) + 'static,
    ) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            id
        };

        if !self.is_supported() {
            tracing::trace!(%element, "no visibility observer, revealing immediately");
            on_enter(element);
            return Subscription(id);
        }

        self.state.borrow_mut().observations.insert(
            id,
            Observation {
                element,
                config,
                on_enter: Box::new(on_enter),
            },
        );
        Subscription(id)
    }

    /// Stop watching. Returns `false` if the subscription already retired.
    pub fn unobserve(&self, subscription: Subscription) -> bool {
        self.state.borrow_mut().observations.remove(&subscription.0).is_some()
    }

    pub fn is_observing(&self, subscription: Subscription) -> bool {
        self.state.borrow().observations.contains_key(&subscription.0)
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.state.borrow().observations.len()
    }

    /// Measure every live subscription against `viewport` (page coordinates).
    ///
    /// Entered subscriptions are retired immediately and returned for
    /// delivery. Elements the document no longer lays out are skipped and
    /// stay subscribed; they simply never fire.
    pub fn recompute<D: Document + ?Sized>(&self, doc: &D, viewport: Rect) -> EnterBatch {
        let mut state = self.state.borrow_mut();
        let entered: Vec<u64> = state
            .observations
            .iter()
            .filter(|(_, obs)| {
                doc.bounding_rect(obs.element)
                    .is_some_and(|rect| obs.config.is_entered(&rect, &viewport))
            })
            .map(|(&id, _)| id)
            .collect();

        let entries = entered
            .into_iter()
            .filter_map(|id| state.observations.remove(&id))
            .map(|obs| (obs.element, obs.on_enter))
            .collect();
        EnterBatch { entries }
    }
}
