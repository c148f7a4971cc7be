//! Timer primitive - schedule/cancel on a virtual clock.
//!
//! Single-threaded stand-in for the host's `setTimeout`/`clearTimeout`.
//! The host drives the clock with [`Timers::advance_to`] (from its frame or
//! timer loop); tests drive it directly, so nothing ever sleeps.
//!
//! # Ordering
//!
//! Timers fire in `(due time, insertion order)`. Two timers due at the same
//! millisecond fire in the order they were scheduled. A callback that
//! schedules another timer measures its delay from the firing timer's due
//! time, so nested timer chains stay deterministic.
//!
//! # Example
//!
//! ```ignore
//! use reveal_kit::engine::Timers;
//!
//! let timers = Timers::new();
//! let id = timers.set_timeout(200, || println!("fired"));
//! timers.advance_by(199); // nothing
//! timers.advance_by(1);   // "fired"
//! assert!(!timers.clear_timeout(id)); // already gone
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::Millis;

// =============================================================================
// TYPES
// =============================================================================

/// Handle returned by [`Timers::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

type TimerCallback = Box<dyn FnOnce()>;

/// Queue key: due time first, then insertion sequence.
type Slot = (Millis, u64);

struct TimerState {
    now: Millis,
    next_seq: u64,
    queue: BTreeMap<Slot, (TimerId, TimerCallback)>,
    slots: HashMap<TimerId, Slot>,
}

impl TimerState {
    fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            slots: HashMap::new(),
        }
    }

    /// Pop the earliest timer due at or before `deadline`.
    fn pop_due(&mut self, deadline: Millis) -> Option<(Millis, TimerId, TimerCallback)> {
        let (&slot, _) = self.queue.first_key_value()?;
        if slot.0 > deadline {
            return None;
        }
        let (id, callback) = self.queue.remove(&slot)?;
        self.slots.remove(&id);
        Some((slot.0, id, callback))
    }
}

// =============================================================================
// TIMERS
// =============================================================================

/// Shared timer queue. Clones refer to the same queue and clock.
#[derive(Clone)]
pub struct Timers {
    state: Rc<RefCell<TimerState>>,
    clock: Signal<Millis>,
}

impl Timers {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TimerState::new())),
            clock: signal(0),
        }
    }

    /// Current clock reading.
    pub fn now(&self) -> Millis {
        self.state.borrow().now
    }

    /// Reactive view of the clock. Updated every time a timer fires and at
    /// the end of every advance.
    pub fn clock_signal(&self) -> Signal<Millis> {
        self.clock.clone()
    }

    /// Schedule `callback` to run `delay` ms from now.
    pub fn set_timeout(&self, delay: Millis, callback: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let id = TimerId(seq);
        let slot = (state.now.saturating_add(delay), seq);
        state.queue.insert(slot, (id, Box::new(callback)));
        state.slots.insert(id, slot);
        tracing::trace!(timer = seq, due = slot.0, "timer scheduled");
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        match state.slots.remove(&id) {
            Some(slot) => {
                state.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state.borrow().slots.contains_key(&id)
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Due time of the next timer, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.state.borrow().queue.first_key_value().map(|(slot, _)| slot.0)
    }

    /// Advance the clock by `ms`, firing everything that comes due.
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance_by(&self, ms: Millis) -> usize {
        let target = self.now().saturating_add(ms);
        self.advance_to(target)
    }

    /// Advance the clock to `target`, firing everything due on the way.
    ///
    /// The clock never moves backwards; a `target` in the past only fires
    /// timers that are already overdue.
    pub fn advance_to(&self, target: Millis) -> usize {
        let mut fired = 0;
        loop {
            // Borrow is released before the callback runs.
            let next = {
                let mut state = self.state.borrow_mut();
                let next = state.pop_due(target);
                if let Some((due, _, _)) = &next {
                    state.now = state.now.max(*due);
                }
                next
            };
            let Some((due, id, callback)) = next else { break };
            self.clock.set(self.now());
            tracing::trace!(timer = id.0, due, "timer fired");
            callback();
            fired += 1;
        }
        {
            let mut state = self.state.borrow_mut();
            state.now = state.now.max(target);
        }
        self.clock.set(self.now());
        fired
    }

    /// Fire timers until the queue is empty, including timers scheduled by
    /// the callbacks themselves.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.next_due() {
            fired += self.advance_to(due);
        }
        fired
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<(&'static str, Millis)>>>, Timers) {
        (Rc::new(RefCell::new(Vec::new())), Timers::new())
    }

    #[test]
    fn test_fires_in_due_order() {
        let (log, timers) = recorder();
        for (name, delay) in [("c", 300), ("a", 100), ("b", 200)] {
            let log = log.clone();
            let t = timers.clone();
            timers.set_timeout(delay, move || log.borrow_mut().push((name, t.now())));
        }

        assert_eq!(timers.advance_by(1000), 3);
        assert_eq!(*log.borrow(), vec![("a", 100), ("b", 200), ("c", 300)]);
        assert_eq!(timers.now(), 1000);
    }

    #[test]
    fn test_same_due_keeps_insertion_order() {
        let (log, timers) = recorder();
        for name in ["first", "second", "third"] {
            let log = log.clone();
            timers.set_timeout(50, move || log.borrow_mut().push((name, 50)));
        }
        timers.advance_by(50);
        let names: Vec<_> = log.borrow().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_clear_timeout() {
        let (log, timers) = recorder();
        let log2 = log.clone();
        let id = timers.set_timeout(10, move || log2.borrow_mut().push(("x", 10)));

        assert!(timers.is_pending(id));
        assert!(timers.clear_timeout(id));
        assert!(!timers.clear_timeout(id));
        timers.advance_by(100);
        assert!(log.borrow().is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_nested_timer_measured_from_due_time() {
        let (log, timers) = recorder();
        let inner_log = log.clone();
        let t = timers.clone();
        timers.set_timeout(100, move || {
            let log = inner_log.clone();
            let t2 = t.clone();
            t.set_timeout(200, move || log.borrow_mut().push(("inner", t2.now())));
        });

        // One big jump still fires the nested timer at its exact due time.
        assert_eq!(timers.advance_by(1000), 2);
        assert_eq!(*log.borrow(), vec![("inner", 300)]);
    }

    #[test]
    fn test_run_until_idle() {
        let (log, timers) = recorder();
        let log2 = log.clone();
        timers.set_timeout(5_000, move || log2.borrow_mut().push(("late", 5_000)));
        assert_eq!(timers.run_until_idle(), 1);
        assert_eq!(timers.now(), 5_000);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_clock_never_goes_back() {
        let timers = Timers::new();
        timers.advance_to(500);
        timers.advance_to(100);
        assert_eq!(timers.now(), 500);
        assert_eq!(timers.clock_signal().get(), 500);
    }
}
