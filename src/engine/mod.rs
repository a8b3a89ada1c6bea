// src/engine/mod.rs

//! Orchestration engine for hotrun.
//!
//! This module turns raw filesystem changes into decisions:
//! - static asset changes become immediate reload broadcasts
//! - source changes feed a single coalescing debounce timer
//! - an expired timer becomes one build job for the supervisor
//!
//! The pure core state machine lives in [`core`]; the async/IO shell that
//! owns the channel and the timer is implemented in [`runtime`].

use std::time::Duration;

use crate::types::ChangeEvent;

/// Quiet period after the last qualifying source change before a build
/// is dispatched.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub debounce_window: Duration,
    /// Explicit files handed to the compiler on every build.
    pub main_files: Vec<String>,
    /// Regenerate API docs before every build.
    pub generate_docs: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            debounce_window: DEBOUNCE_WINDOW,
            main_files: Vec::new(),
            generate_docs: false,
        }
    }
}

/// Events flowing into the runtime from the watcher, the timer and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The watcher observed a change.
    FileChanged(ChangeEvent),
    /// The debounce deadline passed. Produced by the runtime shell itself.
    DebounceElapsed,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod debounce;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use debounce::{CoalescingTimer, DebounceTable};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
