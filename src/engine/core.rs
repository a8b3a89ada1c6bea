// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated debounce state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events, sleeping until [`CoreRuntime::next_deadline`], broadcasting and
//! dispatching builds.
//!
//! Time is passed in explicitly, so the core can be driven in tests without
//! Tokio, channels, a filesystem, or processes.

use std::time::Instant;

use crate::engine::debounce::{CoalescingTimer, DebounceTable};
use crate::engine::event_handlers::{handle_debounce_elapsed, handle_file_change, CoreStep};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::BuildJob;
use crate::watch::ChangeFilter;

/// Reason attached to the build dispatched at startup.
pub const INITIAL_BUILD_REASON: &str = "initial build";

/// Pure core runtime state.
///
/// Owns the change filter, the per-path debounce table and the single
/// coalescing timer.
#[derive(Debug)]
pub struct CoreRuntime {
    filter: ChangeFilter,
    table: DebounceTable,
    timer: CoalescingTimer,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(filter: ChangeFilter, options: RuntimeOptions) -> Self {
        Self {
            filter,
            table: DebounceTable::new(),
            timer: CoalescingTimer::new(options.debounce_window),
            options,
        }
    }

    /// When the shell should wake up and feed `DebounceElapsed`.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Number of distinct paths with a recorded mtime (for tests).
    pub fn tracked_paths(&self) -> usize {
        self.table.len()
    }

    /// The job dispatched once at startup, before any change is observed.
    pub fn initial_job(&self) -> BuildJob {
        BuildJob {
            files: self.options.main_files.clone(),
            generate_docs: self.options.generate_docs,
            reason: INITIAL_BUILD_REASON.to_string(),
        }
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent, now: Instant) -> CoreStep {
        match event {
            RuntimeEvent::FileChanged(change) => handle_file_change(
                &self.filter,
                &mut self.table,
                &mut self.timer,
                change,
                now,
            ),
            RuntimeEvent::DebounceElapsed => {
                handle_debounce_elapsed(&mut self.timer, &self.options, now)
            }
            RuntimeEvent::ShutdownRequested => CoreStep::stop(),
        }
    }
}
