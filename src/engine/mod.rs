//! Engine Module - Host primitives the reveal core runs on.
//!
//! - [`timers`] - Virtual-clock timer queue (schedule/cancel)
//! - [`state`] - Per-element reveal state machine

pub mod state;
pub mod timers;

pub use state::{transition, RevealEffect, RevealEvent, RevealState};
pub use timers::{TimerId, Timers};
