// src/watch/mod.rs

//! File watching and change classification.
//!
//! - [`discovery`] walks the application tree once and decides which
//!   directories to subscribe to.
//! - [`patterns`] holds the ignore rules and the source/static split.
//! - [`watcher`] wires up `notify` and forwards raw changes to the runtime.
//!
//! Nothing here decides when to build; that belongs to the engine.

pub mod discovery;
pub mod patterns;
pub mod watcher;

pub use discovery::{discover_watch_set, DiscoveryOptions, WatchSet};
pub use patterns::{ChangeFilter, IGNORED_FILE_PATTERNS};
pub use watcher::{change_kind, spawn_watcher, WatcherHandle};
