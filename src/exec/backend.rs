// src/exec/backend.rs

//! Pluggable build dispatch.
//!
//! The runtime talks to a `BuildDispatcher` instead of the supervisor
//! directly, so tests can swap in a recorder and drive the runtime without
//! spawning tools or processes.
//!
//! - `SupervisorDispatcher` is the production implementation: it runs each
//!   job on its own task against a shared [`BuildSupervisor`] and, after a
//!   successful restart, tells reload clients.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::errors::Result;
use crate::exec::supervisor::BuildSupervisor;
use crate::reload::HubHandle;
use crate::types::BuildJob;

/// Delay between a restart and the reload broadcast, letting the new
/// instance bind its listener.
pub const RELOAD_SETTLE: Duration = Duration::from_millis(100);

/// Trait abstracting how build jobs are executed.
pub trait BuildDispatcher: Send {
    /// Hand off a job. Must not wait for the build itself; the runtime
    /// keeps consuming events meanwhile.
    fn dispatch(&mut self, job: BuildJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

#[derive(Debug, Clone)]
pub struct SupervisorDispatcher {
    supervisor: Arc<BuildSupervisor>,
    hub: Option<HubHandle>,
    settle: Duration,
}

impl SupervisorDispatcher {
    pub fn new(supervisor: Arc<BuildSupervisor>, hub: Option<HubHandle>) -> Self {
        Self {
            supervisor,
            hub,
            settle: RELOAD_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

impl BuildDispatcher for SupervisorDispatcher {
    fn dispatch(&mut self, job: BuildJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone what the task needs so the future doesn't borrow `self`.
        let supervisor = Arc::clone(&self.supervisor);
        let hub = self.hub.clone();
        let settle = self.settle;

        Box::pin(async move {
            tokio::spawn(async move {
                let reason = job.reason.clone();
                let outcome = supervisor.run(job).await;
                debug!(?outcome, %reason, "build job finished");

                if let (true, Some(hub)) = (outcome.is_success(), hub) {
                    tokio::time::sleep(settle).await;
                    hub.broadcast(reason).await;
                }
            });
            Ok(())
        })
    }
}
