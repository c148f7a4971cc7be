//! Reveal state machine.
//!
//! Every watched element moves `Unseen -> Pending -> Revealed` and never
//! back. Transitions are a pure function of `(state, event)`; the caller
//! performs the returned effect.

/// Visibility state of one watched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    /// Registered, its reveal set has not been seen yet.
    #[default]
    Unseen,
    /// Reveal set seen, transition scheduled.
    Pending,
    /// Transition callback has run.
    Revealed,
}

/// Discrete inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// The owning reveal set crossed its visibility threshold.
    Enter,
    /// The scheduled transition came due.
    Fire,
    /// The element is being unregistered.
    Detach,
}

/// Side effect the caller must carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEffect {
    Nothing,
    /// Hand the element to the stagger scheduler.
    Schedule,
    /// Invoke the element's transition callback.
    Apply,
    /// Cancel the element's outstanding timer.
    Cancel,
}

impl RevealState {
    pub fn is_revealed(self) -> bool {
        self == RevealState::Revealed
    }
}

/// Advance the state machine.
///
/// Repeated or out-of-order events are absorbed with [`RevealEffect::Nothing`].
/// `Detach` does not change the state; the element is dropped by the caller.
pub fn transition(state: RevealState, event: RevealEvent) -> (RevealState, RevealEffect) {
    use RevealEffect as E;
    use RevealEvent as Ev;
    use RevealState as S;

    match (state, event) {
        (S::Unseen, Ev::Enter) => (S::Pending, E::Schedule),
        (S::Pending, Ev::Fire) => (S::Revealed, E::Apply),
        (S::Pending, Ev::Detach) => (S::Pending, E::Cancel),
        (s, _) => (s, E::Nothing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let (s, e) = transition(RevealState::Unseen, RevealEvent::Enter);
        assert_eq!((s, e), (RevealState::Pending, RevealEffect::Schedule));
        let (s, e) = transition(s, RevealEvent::Fire);
        assert_eq!((s, e), (RevealState::Revealed, RevealEffect::Apply));
    }

    #[test]
    fn test_repeated_enter_is_absorbed() {
        assert_eq!(
            transition(RevealState::Pending, RevealEvent::Enter),
            (RevealState::Pending, RevealEffect::Nothing)
        );
        assert_eq!(
            transition(RevealState::Revealed, RevealEvent::Enter),
            (RevealState::Revealed, RevealEffect::Nothing)
        );
    }

    #[test]
    fn test_never_reverses() {
        let all_events = [RevealEvent::Enter, RevealEvent::Fire, RevealEvent::Detach];
        for event in all_events {
            let (s, _) = transition(RevealState::Revealed, event);
            assert_eq!(s, RevealState::Revealed);
        }
        // Fire without Enter does nothing.
        assert_eq!(
            transition(RevealState::Unseen, RevealEvent::Fire),
            (RevealState::Unseen, RevealEffect::Nothing)
        );
    }

    #[test]
    fn test_detach_cancels_only_pending() {
        assert_eq!(transition(RevealState::Pending, RevealEvent::Detach).1, RevealEffect::Cancel);
        assert_eq!(transition(RevealState::Unseen, RevealEvent::Detach).1, RevealEffect::Nothing);
        assert_eq!(transition(RevealState::Revealed, RevealEvent::Detach).1, RevealEffect::Nothing);
    }
}
