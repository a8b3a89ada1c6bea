// src/engine/debounce.rs

//! Debounce state: per-path modification times and the coalescing timer.
//!
//! Both structures are owned by the runtime loop, so no locking is needed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Last modification time seen per path.
///
/// Grows monotonically for the life of the process.
#[derive(Debug, Default)]
pub struct DebounceTable {
    seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl DebounceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `modified` for `path`, returning `true` if it differs from the
    /// previously recorded value (or the path was never seen).
    ///
    /// `None` stands for "file gone"; a repeated removal is therefore not an
    /// advance, but a first removal of a known file is.
    pub fn observe(&mut self, path: &Path, modified: Option<SystemTime>) -> bool {
        match self.seen.insert(path.to_path_buf(), modified) {
            Some(previous) => previous != modified,
            None => true,
        }
    }

    pub fn last_seen(&self, path: &Path) -> Option<Option<SystemTime>> {
        self.seen.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PendingBuild {
    deadline: Instant,
    reason: String,
}

/// A single resettable deadline.
///
/// Every [`reset`](CoalescingTimer::reset) pushes the deadline out and
/// replaces the reason, so a burst of changes yields one expiry carrying the
/// reason of the last change.
#[derive(Debug, Clone)]
pub struct CoalescingTimer {
    window: Duration,
    pending: Option<PendingBuild>,
}

impl CoalescingTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm (or re-arm) the timer. Returns the new deadline.
    pub fn reset(&mut self, now: Instant, reason: String) -> Instant {
        let deadline = now + self.window;
        self.pending = Some(PendingBuild { deadline, reason });
        deadline
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Disarm and return the pending reason if the deadline has passed.
    ///
    /// An early call (the timer was re-armed after the caller started
    /// waiting) leaves the timer untouched.
    pub fn fire(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take().map(|p| p.reason)
        } else {
            None
        }
    }
}
