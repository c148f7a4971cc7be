//! Reveal Module - Viewport Reveal Engine
//!
//! Watches registered elements and plays a one-shot "become visible"
//! transition for each, staggered across the items of a reveal set.
//!
//! - **Watcher** - one-shot threshold crossing per subscription, with a
//!   degrade-to-visible fallback when the host cannot observe
//! - **Scheduler** - `base + i * per_item` delays, cancellable per element
//! - **Registry** - reveal sets, at-most-once transitions, set listeners
//! - **Options** - delays and thresholds, loadable from configuration
//!
//! The engine never touches presentation itself; it calls the apply
//! callback it was given.

mod options;
mod registry;
mod scheduler;
mod watcher;

pub use options::{RevealOptions, DEFAULT_PER_ITEM_DELAY_MS, DEFAULT_ROOT_MARGIN, DEFAULT_VISIBLE_FRACTION};
pub use registry::{resolve_reveal_set, ApplyFn, RevealRegistry};
pub use scheduler::{stagger_delay, FireFn, StaggerScheduler};
pub use watcher::{EnterBatch, Subscription, ThresholdConfig, ThresholdWatcher};

use crate::types::ElementId;

/// Why a registry operation was refused. Never fatal: callers log and move on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevealError {
    #[error("reveal set `{0}` is already registered")]
    DuplicateRevealSet(String),
    #[error("unknown reveal set `{0}`")]
    UnknownRevealSet(String),
    #[error("reveal set `{id}`: no element matches root selector `{selector}`")]
    RootNotFound { id: String, selector: String },
    #[error("{0} is already watched")]
    AlreadyWatched(ElementId),
}
