// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::time::Instant;

use tracing::{debug, info};

use crate::engine::debounce::{CoalescingTimer, DebounceTable};
use crate::engine::RuntimeOptions;
use crate::types::{BuildJob, ChangeClass, ChangeEvent};
use crate::watch::ChangeFilter;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send this text to every connected reload client.
    Broadcast(String),
    /// Hand this job to the build supervisor.
    DispatchBuild(BuildJob),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    pub fn one(command: CoreCommand) -> Self {
        Self {
            commands: vec![command],
            keep_running: true,
        }
    }

    pub fn stop() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: false,
        }
    }
}

/// Handle one change reported by the watcher.
///
/// - ignored or unclassified paths are dropped
/// - static assets are broadcast immediately, without touching the
///   debounce state
/// - source files re-arm the timer only when their mtime moved
pub fn handle_file_change(
    filter: &ChangeFilter,
    table: &mut DebounceTable,
    timer: &mut CoalescingTimer,
    event: ChangeEvent,
    now: Instant,
) -> CoreStep {
    match filter.classify(&event.path) {
        None => {
            debug!(%event, "change dropped by filter");
            CoreStep::idle()
        }
        Some(ChangeClass::Static) => {
            info!(%event, "static asset changed; reloading clients");
            CoreStep::one(CoreCommand::Broadcast(event.to_string()))
        }
        Some(ChangeClass::Source) => {
            if !table.observe(&event.path, event.modified) {
                info!("Skipping: {event}");
                return CoreStep::idle();
            }
            info!("Changed: {event}");
            timer.reset(now, event.to_string());
            CoreStep::idle()
        }
    }
}

/// Handle an expired debounce deadline: emit exactly one build job.
pub fn handle_debounce_elapsed(
    timer: &mut CoalescingTimer,
    options: &RuntimeOptions,
    now: Instant,
) -> CoreStep {
    match timer.fire(now) {
        Some(reason) => CoreStep::one(CoreCommand::DispatchBuild(BuildJob {
            files: options.main_files.clone(),
            generate_docs: options.generate_docs,
            reason,
        })),
        None => CoreStep::idle(),
    }
}
