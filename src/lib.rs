//! # reveal-kit
//!
//! Scroll-triggered reveal animations for static invitation pages.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! reactive element state.
//!
//! ## Architecture
//!
//! The core is a small viewport reveal engine: registered elements play a
//! one-shot "become visible" transition when their section scrolls into
//! view, staggered across the items of a reveal set. It consumes three host
//! capabilities, all behind seams that tests drive deterministically:
//!
//! ```text
//! viewport change -> ThresholdWatcher -> RevealRegistry -> StaggerScheduler -> apply(el)
//!                                                               |
//!                                                            Timers (virtual clock)
//! ```
//!
//! Everything runs on one thread. Controllers are owned values that share
//! state through `Rc`; nothing is global.
//!
//! ## Modules
//!
//! - [`types`] - Core types (ElementId, Rect, RootMargin, HostCapabilities)
//! - [`engine`] - Timers and the per-element reveal state machine
//! - [`dom`] - Document/Presentation traits, selectors, in-memory document
//! - [`reveal`] - Threshold watcher, stagger scheduler, reveal registry
//! - [`limiter`] - Debounce and throttle
//! - [`config`] - JSON page configuration
//! - [`page`] - Invitation page wiring (modal, navigation, form, effects)

pub mod config;
pub mod dom;
pub mod engine;
pub mod limiter;
pub mod page;
pub mod reveal;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{transition, RevealEffect, RevealEvent, RevealState, TimerId, Timers};

pub use dom::{Document, MemoryDocument, Presentation, Selector, SelectorError};

pub use reveal::{
    resolve_reveal_set, stagger_delay, EnterBatch, RevealError, RevealOptions, RevealRegistry,
    StaggerScheduler, Subscription, ThresholdConfig, ThresholdWatcher,
};

pub use limiter::{debounce, throttle, Debounced, Throttled};

pub use config::{ConfigError, PageConfig, RevealSetConfig};

pub use page::{
    FormError, ImageModal, InvitationPage, KeyboardEvent, NavMenu, Notice, NoticeKind, PageEvent,
    RsvpForm, RsvpSubmission, ScrollRequest, Typewriter,
};
