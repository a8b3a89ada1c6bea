// src/engine/runtime.rs

use std::fmt;
use std::time::Instant as StdInstant;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::BuildDispatcher;
use crate::reload::HubHandle;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the debounce core in response to `RuntimeEvent`s and its own
/// timer, and delegates builds to a `BuildDispatcher`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<D: BuildDispatcher> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    dispatcher: D,
    hub: Option<HubHandle>,
}

impl<D: BuildDispatcher> fmt::Debug for Runtime<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("reload", &self.hub.is_some())
            .finish_non_exhaustive()
    }
}

impl<D: BuildDispatcher> Runtime<D> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        dispatcher: D,
        hub: Option<HubHandle>,
    ) -> Self {
        Self {
            core,
            event_rx,
            dispatcher,
            hub,
        }
    }

    /// Main event loop.
    ///
    /// - Waits for the next event or the debounce deadline, whichever
    ///   comes first.
    /// - Feeds it into the core runtime.
    /// - Executes commands returned by the core.
    pub async fn run(mut self) -> Result<()> {
        info!("hotrun runtime started");

        loop {
            let deadline = self.core.next_deadline();

            let event = tokio::select! {
                maybe = self.event_rx.recv() => match maybe {
                    Some(e) => e,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
                _ = sleep_until(deadline) => RuntimeEvent::DebounceElapsed,
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event, Instant::now().into_std());

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Broadcast(message) => match &self.hub {
                Some(hub) => {
                    if !hub.broadcast(message).await {
                        warn!("reload hub is gone; broadcast dropped");
                    }
                }
                None => debug!("live reload disabled; broadcast dropped"),
            },
            CoreCommand::DispatchBuild(job) => {
                debug!(reason = %job.reason, "dispatching build");
                self.dispatcher.dispatch(job).await?;
            }
        }
        Ok(())
    }
}

async fn sleep_until(deadline: Option<StdInstant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(Instant::from_std(d)).await,
        None => std::future::pending::<()>().await,
    }
}
