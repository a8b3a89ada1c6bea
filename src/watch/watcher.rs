// src/watch/watcher.rs

use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{HotrunError, Result};
use crate::fs::FileSystem;
use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::discovery::WatchSet;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle stops
/// file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Subscribe to every directory of `watch_set` and forward each raw change
/// as `RuntimeEvent::FileChanged`.
///
/// Subscriptions are non-recursive; discovery has already enumerated the
/// directories. Failing to subscribe to any one of them aborts startup.
pub fn spawn_watcher(
    watch_set: &WatchSet,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver only disappears at shutdown.
            let _ = event_tx.send(res);
        },
        Config::default(),
    )
    .map_err(|source| HotrunError::WatchInit {
        path: watch_set.dirs.first().cloned().unwrap_or_default(),
        source,
    })?;

    for dir in &watch_set.dirs {
        debug!(?dir, "watching directory");
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| HotrunError::WatchInit {
                path: dir.clone(),
                source,
            })?;
    }

    info!(dirs = watch_set.dirs.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "file watch error");
                    continue;
                }
            };

            let Some(kind) = change_kind(&event.kind) else {
                continue;
            };

            for path in event.paths {
                let modified = fs.modified(&path);
                let change = ChangeEvent::new(path, kind, modified);
                if runtime_tx.send(RuntimeEvent::FileChanged(change)).await.is_err() {
                    debug!("runtime channel closed; watcher loop exiting");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Map a notify event kind onto the subset this tool reacts to.
///
/// Access events and anything notify cannot classify are dropped.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Modify(_) => Some(ChangeKind::Write),
        EventKind::Remove(_) => Some(ChangeKind::Remove),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}
