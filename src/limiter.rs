//! Rate Limiters - debounce and throttle
//!
//! Standalone wrappers for scroll/resize handlers. They only need a
//! [`Timers`] clock; nothing here depends on the reveal registry.
//!
//! # API
//!
//! - `debounce(timers, wait, f)` - collapse a burst into one call, `wait` ms
//!   after the last call, with the last call's arguments
//! - `throttle(timers, limit, f)` - first call of a window runs immediately,
//!   the rest of the window is dropped
//!
//! Neither queues dropped calls; they are discarded.
//!
//! # Example
//!
//! ```ignore
//! let on_resize = debounce(&timers, 250, |width: f32| relayout(width));
//! on_resize.call(800.0);
//! on_resize.call(820.0); // replaces the pending call
//!
//! let on_scroll = throttle(&timers, 16, |y: f32| parallax(y));
//! on_scroll.call(10.0); // runs
//! on_scroll.call(12.0); // dropped
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{TimerId, Timers};
use crate::types::Millis;

// =============================================================================
// DEBOUNCE
// =============================================================================

/// Debounced wrapper around `f`. Clones share the pending-timer slot.
pub struct Debounced<A> {
    timers: Timers,
    wait: Millis,
    pending: Rc<Cell<Option<TimerId>>>,
    f: Rc<dyn Fn(A)>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            timers: self.timers.clone(),
            wait: self.wait,
            pending: self.pending.clone(),
            f: self.f.clone(),
        }
    }
}

/// Wrap `f` so it runs once, `wait` ms after the last call of a burst.
pub fn debounce<A: 'static>(timers: &Timers, wait: Millis, f: impl Fn(A) + 'static) -> Debounced<A> {
    Debounced {
        timers: timers.clone(),
        wait,
        pending: Rc::new(Cell::new(None)),
        f: Rc::new(f),
    }
}

impl<A: 'static> Debounced<A> {
    /// Restart the wait with `args` as the arguments to use.
    pub fn call(&self, args: A) {
        if let Some(timer) = self.pending.take() {
            self.timers.clear_timeout(timer);
        }
        let slot = Rc::downgrade(&self.pending);
        let f = self.f.clone();
        let timer = self.timers.set_timeout(self.wait, move || {
            if let Some(slot) = slot.upgrade() {
                slot.set(None);
            }
            f(args);
        });
        self.pending.set(Some(timer));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(timer) => self.timers.clear_timeout(timer),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some_and(|timer| self.timers.is_pending(timer))
    }
}

// =============================================================================
// THROTTLE
// =============================================================================

/// Throttled wrapper around `f`. Clones share the window.
pub struct Throttled<A> {
    timers: Timers,
    limit: Millis,
    window_start: Rc<Cell<Option<Millis>>>,
    f: Rc<dyn Fn(A)>,
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            timers: self.timers.clone(),
            limit: self.limit,
            window_start: self.window_start.clone(),
            f: self.f.clone(),
        }
    }
}

/// Wrap `f` so it runs at most once per `limit` ms window.
pub fn throttle<A: 'static>(timers: &Timers, limit: Millis, f: impl Fn(A) + 'static) -> Throttled<A> {
    Throttled {
        timers: timers.clone(),
        limit,
        window_start: Rc::new(Cell::new(None)),
        f: Rc::new(f),
    }
}

impl<A> Throttled<A> {
    /// Run `f(args)` unless a window is open. Returns whether it ran.
    pub fn call(&self, args: A) -> bool {
        let now = self.timers.now();
        if self.in_window(now) {
            return false;
        }
        self.window_start.set(Some(now));
        (self.f)(args);
        true
    }

    /// Whether calls made now would be dropped.
    pub fn is_throttled(&self) -> bool {
        self.in_window(self.timers.now())
    }

    fn in_window(&self, now: Millis) -> bool {
        self.window_start
            .get()
            .is_some_and(|start| now < start.saturating_add(self.limit))
    }
}

// =============================================================================
// TESTS
// =============================================================================
