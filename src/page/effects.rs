//! Decorative effects: parallax, hero entrance delays, typewriter.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::{TimerId, Timers};
use crate::types::Millis;

// =============================================================================
// PARALLAX
// =============================================================================

/// Vertical offset for an element moving at `speed` times the scroll speed.
pub fn parallax_offset(scroll_y: f32, speed: f32) -> f32 {
    scroll_y.max(0.0) * speed
}

/// CSS transform for [`parallax_offset`].
pub fn parallax_transform(scroll_y: f32, speed: f32) -> String {
    format!("translateY({}px)", parallax_offset(scroll_y, speed))
}

// =============================================================================
// HERO ENTRANCE
// =============================================================================

/// First hero element starts after this long.
pub const HERO_ENTRANCE_BASE_MS: Millis = 500;

/// Gap between consecutive hero elements.
pub const HERO_ENTRANCE_STEP_MS: Millis = 300;

/// Animation delays for `count` hero elements, in document order.
pub fn entrance_delays(count: usize) -> Vec<Millis> {
    (0..count)
        .map(|i| crate::reveal::stagger_delay(i, HERO_ENTRANCE_BASE_MS, HERO_ENTRANCE_STEP_MS))
        .collect()
}

/// CSS `animation-delay` value, in seconds like the stylesheet expects.
pub fn css_seconds(ms: Millis) -> String {
    format!("{}s", ms as f64 / 1000.0)
}

// =============================================================================
// TYPEWRITER
// =============================================================================

struct TypeState {
    chars: Vec<char>,
    typed: usize,
    timer: Option<TimerId>,
}

/// Types text one character per tick. Drop-safe: pending ticks of a
/// dropped typewriter do nothing.
pub struct Typewriter {
    timers: Timers,
    state: Rc<RefCell<TypeState>>,
}

type ProgressFn = Rc<dyn Fn(&str)>;

impl Typewriter {
    /// Start typing `text`. The first character appears immediately, each
    /// following one `speed_ms` later. `on_progress` receives the text typed
    /// so far.
    pub fn start(
        timers: &Timers,
        text: &str,
        speed_ms: Millis,
        on_progress: impl Fn(&str) + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(TypeState {
            chars: text.chars().collect(),
            typed: 0,
            timer: None,
        }));
        let on_progress: ProgressFn = Rc::new(on_progress);
        step(timers, Rc::downgrade(&state), speed_ms, on_progress);
        Self {
            timers: timers.clone(),
            state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().timer.is_some()
    }

    /// Characters typed so far.
    pub fn typed(&self) -> usize {
        self.state.borrow().typed
    }

    /// Stop typing, leaving the text where it is.
    pub fn cancel(&self) -> bool {
        let timer = self.state.borrow_mut().timer.take();
        timer.is_some_and(|t| self.timers.clear_timeout(t))
    }
}

fn step(timers: &Timers, state: Weak<RefCell<TypeState>>, speed_ms: Millis, on_progress: ProgressFn) {
    let Some(strong) = state.upgrade() else { return };
    let (prefix, more) = {
        let mut s = strong.borrow_mut();
        s.timer = None;
        if s.typed >= s.chars.len() {
            return;
        }
        s.typed += 1;
        (s.chars[..s.typed].iter().collect::<String>(), s.typed < s.chars.len())
    };
    on_progress(&prefix);
    if more {
        let t = timers.clone();
        let next_state = state.clone();
        let timer = timers.set_timeout(speed_ms, move || step(&t, next_state, speed_ms, on_progress));
        strong.borrow_mut().timer = Some(timer);
    }
}
