//! Reveal Registry - reveal sets, at-most-once transitions.
//!
//! A reveal set is an anchor element (usually a section) plus an ordered list
//! of items. When the anchor enters the viewport every item goes
//! `Unseen -> Pending` and is handed to the [`StaggerScheduler`]; when its
//! timer fires it goes `Pending -> Revealed` and its transition callback
//! runs. Each element belongs to at most one set and transitions at most
//! once, however often the anchor reports entry.
//!
//! # Example
//!
//! ```ignore
//! let timers = Timers::new();
//! let registry = RevealRegistry::new(&timers, HostCapabilities::all(), |el| {
//!     doc.borrow_mut().add_class(el, "visible");
//! });
//! registry.register_reveal_set(&doc, "gallery", ".gallery-section", ".gallery-item",
//!     RevealOptions::with_delays(0, 100))?;
//!
//! // On every scroll:
//! registry.handle_viewport(&doc, Rect::new(0.0, scroll_y, width, height));
//! timers.advance_to(now);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use super::options::RevealOptions;
use super::scheduler::{FireFn, StaggerScheduler};
use super::watcher::{EnterBatch, Subscription, ThresholdWatcher};
use super::RevealError;
use crate::dom::Document;
use crate::engine::{transition, RevealEffect, RevealEvent, RevealState, Timers};
use crate::types::{ElementId, HostCapabilities, Rect};

// =============================================================================
// TYPES
// =============================================================================

/// Caller-supplied "apply visible state" callback.
pub type ApplyFn = Rc<dyn Fn(ElementId)>;

type SetListener = Box<dyn FnOnce(ElementId)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SetKey {
    Named(String),
    /// Created by `on_reveal`: the element is its own anchor.
    Single(ElementId),
}

struct Watchable {
    set: SetKey,
    state: Signal<RevealState>,
    callback: ApplyFn,
}

struct RevealSet {
    anchor: ElementId,
    items: Vec<ElementId>,
    options: RevealOptions,
    subscription: Option<Subscription>,
    visible: bool,
    listeners: Vec<SetListener>,
}

#[derive(Default)]
struct RegistryState {
    sets: HashMap<SetKey, RevealSet>,
    watchables: HashMap<ElementId, Watchable>,
}

struct Inner {
    state: RefCell<RegistryState>,
    watcher: ThresholdWatcher,
    scheduler: StaggerScheduler,
    apply: ApplyFn,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Scan the document once: first match of `root_selector`, then its
/// descendants matching `item_selector` in document order.
///
/// Returns `None` when no root matches (including invalid selectors).
pub fn resolve_reveal_set<D: Document + ?Sized>(
    doc: &D,
    root_selector: &str,
    item_selector: &str,
) -> Option<(ElementId, Vec<ElementId>)> {
    let root = doc.query_selector(root_selector)?;
    Some((root, doc.query_within(root, item_selector)))
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Owned reveal controller. Clones share state.
#[derive(Clone)]
pub struct RevealRegistry {
    inner: Rc<Inner>,
}

impl RevealRegistry {
    /// `apply` is the default transition callback for items of named sets.
    pub fn new(
        timers: &Timers,
        capabilities: HostCapabilities,
        apply: impl Fn(ElementId) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(RegistryState::default()),
                watcher: ThresholdWatcher::new(capabilities),
                scheduler: StaggerScheduler::new(timers),
                apply: Rc::new(apply),
            }),
        }
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn watcher(&self) -> &ThresholdWatcher {
        &self.inner.watcher
    }

    pub fn scheduler(&self) -> &StaggerScheduler {
        &self.inner.scheduler
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register a named reveal set anchored at `anchor`.
    ///
    /// Items already watched by another set are left with that set, and
    /// duplicates within `items` are dropped. An empty set is legal. Returns
    /// the number of items this set owns.
    ///
    /// Without a visibility observer the whole set is revealed before this
    /// returns.
    pub fn register(
        &self,
        id: &str,
        anchor: ElementId,
        items: &[ElementId],
        options: RevealOptions,
    ) -> Result<usize, RevealError> {
        let key = SetKey::Named(id.to_string());
        let owned = {
            let mut state = self.inner.state.borrow_mut();
            if state.sets.contains_key(&key) {
                tracing::warn!(set = id, "reveal set already registered");
                return Err(RevealError::DuplicateRevealSet(id.to_string()));
            }

            let mut seen = HashSet::new();
            let mut owned = Vec::with_capacity(items.len());
            for &el in items {
                if state.watchables.contains_key(&el) || !seen.insert(el) {
                    tracing::debug!(set = id, element = %el, "element already watched, skipping");
                    continue;
                }
                owned.push(el);
            }
            for &el in &owned {
                state.watchables.insert(
                    el,
                    Watchable {
                        set: key.clone(),
                        state: signal(RevealState::Unseen),
                        callback: self.inner.apply.clone(),
                    },
                );
            }
            state.sets.insert(key.clone(), RevealSet::new(anchor, owned.clone(), options));
            owned.len()
        };

        tracing::debug!(set = id, %anchor, items = owned, "reveal set registered");
        self.watch_anchor(key, anchor, options);
        Ok(owned)
    }

    /// Resolve selectors against `doc` once and register the result.
    ///
    /// Later DOM changes are not tracked. If `doc` sits behind a `RefCell`
    /// that the apply callback also borrows, resolve with
    /// [`resolve_reveal_set`] first and call [`register`](Self::register)
    /// after releasing the borrow.
    pub fn register_reveal_set<D: Document + ?Sized>(
        &self,
        doc: &D,
        id: &str,
        root_selector: &str,
        item_selector: &str,
        options: RevealOptions,
    ) -> Result<usize, RevealError> {
        let (root, items) = resolve_reveal_set(doc, root_selector, item_selector).ok_or_else(|| {
            RevealError::RootNotFound {
                id: id.to_string(),
                selector: root_selector.to_string(),
            }
        })?;
        self.register(id, root, &items, options)
    }

    /// Watch a single element with its own callback and the default options.
    pub fn on_reveal(
        &self,
        element: ElementId,
        callback: impl Fn(ElementId) + 'static,
    ) -> Result<(), RevealError> {
        let options = RevealOptions {
            base_delay_ms: 0,
            per_item_delay_ms: 0,
            ..RevealOptions::default()
        };
        self.on_reveal_with(element, options, callback)
    }

    /// [`on_reveal`](Self::on_reveal) with explicit options.
    pub fn on_reveal_with(
        &self,
        element: ElementId,
        options: RevealOptions,
        callback: impl Fn(ElementId) + 'static,
    ) -> Result<(), RevealError> {
        let key = SetKey::Single(element);
        {
            let mut state = self.inner.state.borrow_mut();
            if state.watchables.contains_key(&element) {
                return Err(RevealError::AlreadyWatched(element));
            }
            state.watchables.insert(
                element,
                Watchable {
                    set: key.clone(),
                    state: signal(RevealState::Unseen),
                    callback: Rc::new(callback),
                },
            );
            state.sets.insert(key.clone(), RevealSet::new(element, vec![element], options));
        }
        self.watch_anchor(key, element, options);
        Ok(())
    }

    /// Call `callback` with the anchor once the named set becomes visible.
    ///
    /// A set that is already visible calls back immediately.
    pub fn on_reveal_set_visible(
        &self,
        id: &str,
        callback: impl FnOnce(ElementId) + 'static,
    ) -> Result<(), RevealError> {
        let key = SetKey::Named(id.to_string());
        let anchor = {
            let mut state = self.inner.state.borrow_mut();
            let set = state
                .sets
                .get_mut(&key)
                .ok_or_else(|| RevealError::UnknownRevealSet(id.to_string()))?;
            if !set.visible {
                set.listeners.push(Box::new(callback));
                return Ok(());
            }
            set.anchor
        };
        callback(anchor);
        Ok(())
    }

    fn watch_anchor(&self, key: SetKey, anchor: ElementId, options: RevealOptions) {
        let weak = Rc::downgrade(&self.inner);
        let entered_key = key.clone();
        let subscription = self.inner.watcher.observe(anchor, options.threshold(), move |_| {
            if let Some(registry) = Self::from_weak(&weak) {
                registry.set_entered(&entered_key);
            }
        });
        if let Some(set) = self.inner.state.borrow_mut().sets.get_mut(&key) {
            if !set.visible {
                set.subscription = Some(subscription);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// The anchor of `key` entered the viewport.
    fn set_entered(&self, key: &SetKey) {
        let (anchor, items, options, listeners, updates) = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            let Some(set) = state.sets.get_mut(key) else { return };
            if set.visible {
                return;
            }
            set.visible = true;
            set.subscription = None;

            let mut scheduled = Vec::with_capacity(set.items.len());
            let mut updates = Vec::with_capacity(set.items.len());
            for &el in &set.items {
                let Some(w) = state.watchables.get(&el) else { continue };
                let (next, effect) = transition(w.state.get(), RevealEvent::Enter);
                if effect == RevealEffect::Schedule {
                    scheduled.push(el);
                    updates.push((w.state.clone(), next));
                }
            }
            (set.anchor, scheduled, set.options, std::mem::take(&mut set.listeners), updates)
        };

        // Signals are set with the registry unborrowed so effects may query it.
        for (signal, next) in updates {
            signal.set(next);
        }
        tracing::debug!(?key, %anchor, items = items.len(), "reveal set visible");

        if self.inner.watcher.is_supported() {
            let weak = Rc::downgrade(&self.inner);
            let fire: FireFn = Rc::new(move |el| {
                if let Some(registry) = Self::from_weak(&weak) {
                    registry.fire(el);
                }
            });
            self.inner
                .scheduler
                .schedule(&items, options.base_delay_ms, options.per_item_delay_ms, fire);
        } else {
            for el in items {
                self.fire(el);
            }
        }

        for listener in listeners {
            listener(anchor);
        }
    }

    /// Scheduled time for `el` arrived.
    fn fire(&self, el: ElementId) {
        let found = {
            let state = self.inner.state.borrow();
            state.watchables.get(&el).map(|w| {
                let (next, effect) = transition(w.state.get(), RevealEvent::Fire);
                (w.state.clone(), w.callback.clone(), next, effect)
            })
        };
        let Some((signal, callback, next, effect)) = found else { return };
        if effect != RevealEffect::Apply {
            return;
        }
        signal.set(next);
        tracing::trace!(element = %el, "revealed");
        callback(el);
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Stop tracking `element`, cancelling its pending transition.
    ///
    /// Returns `false` if the element was not registered.
    pub fn unregister(&self, element: ElementId) -> bool {
        let (watchable, retired) = {
            let mut state = self.inner.state.borrow_mut();
            let Some(watchable) = state.watchables.remove(&element) else { return false };
            let retired = match &watchable.set {
                SetKey::Single(_) => state.sets.remove(&watchable.set).and_then(|s| s.subscription),
                named => {
                    if let Some(set) = state.sets.get_mut(named) {
                        set.items.retain(|&el| el != element);
                    }
                    None
                }
            };
            (watchable, retired)
        };

        if let Some(subscription) = retired {
            self.inner.watcher.unobserve(subscription);
        }
        let (_, effect) = transition(watchable.state.get(), RevealEvent::Detach);
        if effect == RevealEffect::Cancel {
            self.inner.scheduler.cancel(element);
            tracing::trace!(%element, "pending reveal cancelled");
        }
        true
    }

    /// Drop a named set: stop watching its anchor and cancel its items.
    ///
    /// Returns the number of items that were removed.
    pub fn unregister_set(&self, id: &str) -> Result<usize, RevealError> {
        let key = SetKey::Named(id.to_string());
        let set = self
            .inner
            .state
            .borrow_mut()
            .sets
            .remove(&key)
            .ok_or_else(|| RevealError::UnknownRevealSet(id.to_string()))?;

        if let Some(subscription) = set.subscription {
            self.inner.watcher.unobserve(subscription);
        }
        for &el in &set.items {
            self.inner.state.borrow_mut().watchables.remove(&el);
            self.inner.scheduler.cancel(el);
        }
        Ok(set.items.len())
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Measure anchors against `viewport`. Deliver the batch once any borrow
    /// of the document has been released.
    pub fn measure<D: Document + ?Sized>(&self, doc: &D, viewport: Rect) -> EnterBatch {
        self.inner.watcher.recompute(doc, viewport)
    }

    /// Measure and deliver in one step. Returns how many anchors entered.
    pub fn handle_viewport<D: Document + ?Sized>(&self, doc: &D, viewport: Rect) -> usize {
        self.measure(doc, viewport).deliver()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn state(&self, element: ElementId) -> Option<RevealState> {
        self.inner.state.borrow().watchables.get(&element).map(|w| w.state.get())
    }

    /// Reactive view of an element's state.
    pub fn state_signal(&self, element: ElementId) -> Option<Signal<RevealState>> {
        self.inner.state.borrow().watchables.get(&element).map(|w| w.state.clone())
    }

    /// `None` for unknown sets.
    pub fn is_set_visible(&self, id: &str) -> Option<bool> {
        let key = SetKey::Named(id.to_string());
        self.inner.state.borrow().sets.get(&key).map(|s| s.visible)
    }

    /// Items owned by a named set, in stagger order.
    pub fn set_items(&self, id: &str) -> Option<Vec<ElementId>> {
        let key = SetKey::Named(id.to_string());
        self.inner.state.borrow().sets.get(&key).map(|s| s.items.clone())
    }

    /// Number of registered elements.
    pub fn watched(&self) -> usize {
        self.inner.state.borrow().watchables.len()
    }

    pub fn revealed_count(&self) -> usize {
        self.inner
            .state
            .borrow()
            .watchables
            .values()
            .filter(|w| w.state.get().is_revealed())
            .count()
    }
}

impl RevealSet {
    fn new(anchor: ElementId, items: Vec<ElementId>, options: RevealOptions) -> Self {
        Self {
            anchor,
            items,
            options,
            subscription: None,
            visible: false,
            listeners: Vec::new(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
