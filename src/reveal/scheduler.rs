//! Stagger Scheduler - sequential, cancellable transitions.
//!
//! The i-th element of a sequence fires `base + i * per_item` ms after the
//! call. Fire order always matches sequence order: due times never decrease
//! along the sequence and equal due times fire in insertion order.
//!
//! An element has at most one outstanding timer. Scheduling an element that
//! is already waiting is a no-op; [`StaggerScheduler::cancel`] removes its
//! timer so the fire callback never runs for it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::{TimerId, Timers};
use crate::types::{ElementId, Millis};

/// Callback run when an element's turn comes.
pub type FireFn = Rc<dyn Fn(ElementId)>;

/// Delay for the item at `index`, saturating instead of overflowing.
pub fn stagger_delay(index: usize, base_delay_ms: Millis, per_item_delay_ms: Millis) -> Millis {
    let index = Millis::try_from(index).unwrap_or(Millis::MAX);
    base_delay_ms.saturating_add(index.saturating_mul(per_item_delay_ms))
}

#[derive(Default)]
struct SchedulerState {
    outstanding: HashMap<ElementId, TimerId>,
}

#[derive(Clone)]
pub struct StaggerScheduler {
    timers: Timers,
    state: Rc<RefCell<SchedulerState>>,
}

impl StaggerScheduler {
    pub fn new(timers: &Timers) -> Self {
        Self {
            timers: timers.clone(),
            state: Rc::new(RefCell::new(SchedulerState::default())),
        }
    }

    /// Schedule `fire` for each element of `ordered`, staggered by index.
    ///
    /// Returns how many timers were created (elements already waiting are
    /// skipped but still occupy their index).
    pub fn schedule(
        &self,
        ordered: &[ElementId],
        base_delay_ms: Millis,
        per_item_delay_ms: Millis,
        fire: FireFn,
    ) -> usize {
        let mut created = 0;
        for (index, &element) in ordered.iter().enumerate() {
            if self.is_scheduled(element) {
                tracing::trace!(%element, "already scheduled, skipping");
                continue;
            }
            let delay = stagger_delay(index, base_delay_ms, per_item_delay_ms);
            let state = Rc::downgrade(&self.state);
            let fire = fire.clone();
            let timer = self.timers.set_timeout(delay, move || {
                if let Some(state) = state.upgrade() {
                    state.borrow_mut().outstanding.remove(&element);
                }
                fire(element);
            });
            self.state.borrow_mut().outstanding.insert(element, timer);
            created += 1;
        }
        created
    }

    /// Cancel `element`'s pending timer. Returns `false` if none was pending.
    pub fn cancel(&self, element: ElementId) -> bool {
        let timer = self.state.borrow_mut().outstanding.remove(&element);
        match timer {
            Some(timer) => self.timers.clear_timeout(timer),
            None => false,
        }
    }

    /// Cancel every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<TimerId> = self.state.borrow_mut().outstanding.drain().map(|(_, t)| t).collect();
        drained.into_iter().filter(|&t| self.timers.clear_timeout(t)).count()
    }

    pub fn is_scheduled(&self, element: ElementId) -> bool {
        self.state.borrow().outstanding.contains_key(&element)
    }

    /// Number of elements waiting to fire.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<(ElementId, Millis)>>>;

    fn recording_fire(timers: &Timers) -> (Log, FireFn) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let t = timers.clone();
        (log, Rc::new(move |el| l.borrow_mut().push((el, t.now()))))
    }

    fn ids(n: u32) -> Vec<ElementId> {
        (0..n).map(ElementId).collect()
    }

    #[test]
    fn test_stagger_delay_formula() {
        assert_eq!(stagger_delay(0, 100, 200), 100);
        assert_eq!(stagger_delay(3, 100, 200), 700);
        assert_eq!(stagger_delay(usize::MAX, 1, Millis::MAX), Millis::MAX);
    }

    #[test]
    fn test_fire_times_match_scenario() {
        let timers = Timers::new();
        let scheduler = StaggerScheduler::new(&timers);
        let (log, fire) = recording_fire(&timers);
        let els = ids(3);

        assert_eq!(scheduler.schedule(&els, 0, 200, fire), 3);
        timers.run_until_idle();

        assert_eq!(*log.borrow(), vec![(els[0], 0), (els[1], 200), (els[2], 400)]);
        assert_eq!(scheduler.outstanding(), 0);
    }

    #[test]
    fn test_order_preserved_with_zero_stride() {
        let timers = Timers::new();
        let scheduler = StaggerScheduler::new(&timers);
        let (log, fire) = recording_fire(&timers);
        let els = ids(5);

        scheduler.schedule(&els, 50, 0, fire);
        timers.advance_by(50);

        let order: Vec<_> = log.borrow().iter().map(|(el, _)| *el).collect();
        assert_eq!(order, els);
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let timers = Timers::new();
        let scheduler = StaggerScheduler::new(&timers);
        let (log, fire) = recording_fire(&timers);
        let els = ids(3);

        scheduler.schedule(&els, 0, 100, fire);
        timers.advance_by(50);
        assert!(scheduler.cancel(els[1]));
        assert!(!scheduler.cancel(els[1]));
        timers.run_until_idle();

        let fired: Vec<_> = log.borrow().iter().map(|(el, _)| *el).collect();
        assert_eq!(fired, vec![els[0], els[2]]);
    }

    #[test]
    fn test_at_most_one_outstanding_per_element() {
        let timers = Timers::new();
        let scheduler = StaggerScheduler::new(&timers);
        let (log, fire) = recording_fire(&timers);
        let els = ids(2);

        assert_eq!(scheduler.schedule(&els, 0, 100, fire.clone()), 2);
        assert_eq!(scheduler.schedule(&els, 0, 100, fire), 0);
        timers.run_until_idle();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_cancel_all() {
        let timers = Timers::new();
        let scheduler = StaggerScheduler::new(&timers);
        let (log, fire) = recording_fire(&timers);

        scheduler.schedule(&ids(4), 10, 10, fire);
        assert_eq!(scheduler.cancel_all(), 4);
        assert_eq!(timers.run_until_idle(), 0);
        assert!(log.borrow().is_empty());
    }
}
