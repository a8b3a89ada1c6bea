// src/types.rs

use std::fmt;
use std::path::PathBuf;
use std::time::{Instant, SystemTime};

/// Kind of filesystem change reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Write => "WRITE",
            ChangeKind::Remove => "REMOVE",
            ChangeKind::Rename => "RENAME",
        };
        f.write_str(s)
    }
}

/// A single raw change produced by the path watcher.
///
/// `modified` is the file's modification time sampled when the event was
/// observed; `None` when the file is gone or unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub observed_at: Instant,
    pub modified: Option<SystemTime>,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind, modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            kind,
            observed_at: Instant::now(),
            modified,
        }
    }
}

/// Rendered the way reload clients see it: `WRITE "/app/main.go"`.
impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.path.display().to_string())
    }
}

/// How a qualifying change is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    /// Asset change: reload connected clients, no rebuild.
    Static,
    /// Source change: schedule a rebuild.
    Source,
}

/// A unit of work for the build supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    /// Explicit files handed to the compiler; empty means "the package".
    pub files: Vec<String>,
    pub generate_docs: bool,
    /// Human-readable trigger, forwarded to reload clients after a restart.
    pub reason: String,
}

/// Steps of the build pipeline, used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    PreInstall,
    Docs,
    Compile,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildStep::PreInstall => "pre-install",
            BuildStep::Docs => "doc generation",
            BuildStep::Compile => "compile",
        };
        f.write_str(s)
    }
}

/// Result of one supervised build job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Built and the application was restarted.
    Success,
    /// A build step failed; the running instance was left alone.
    BuildFailed,
    /// Built, but the new instance could not be spawned.
    StartFailed,
}

impl BuildOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, BuildOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_event_display_quotes_path() {
        let ev = ChangeEvent::new("/app/main.go", ChangeKind::Write, None);
        assert_eq!(ev.to_string(), r#"WRITE "/app/main.go""#);
    }
}
