// src/watch/discovery.rs

//! Project layout discovery.
//!
//! The OS notification primitive is not recursive, so every directory that
//! may contain relevant files is collected up front and subscribed to
//! individually by the watcher.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::watch::patterns::ChangeFilter;

/// Directories to subscribe to, plus explicit files handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    pub dirs: Vec<PathBuf>,
    pub main_files: Vec<String>,
}

/// Knobs for [`discover_watch_set`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Absolute paths whose subtrees are skipped.
    pub excluded: Vec<PathBuf>,
    /// Walk `vendor/` directories too.
    pub watch_vendor: bool,
    /// Extra roots walked with the same rules as the application root.
    pub extra_roots: Vec<PathBuf>,
    /// Directories added verbatim, without walking.
    pub others: Vec<PathBuf>,
}

/// Walk `root` (and any extra roots) and build the [`WatchSet`].
///
/// Directory order is stable: depth-first, entries sorted by name, duplicates
/// dropped keeping the first occurrence.
pub fn discover_watch_set(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &ChangeFilter,
    options: &DiscoveryOptions,
    main_files: &[String],
) -> WatchSet {
    let mut dirs = Vec::new();
    read_app_directories(fs, root, filter, options, &mut dirs);

    for other in &options.others {
        dirs.push(other.clone());
    }

    for extra in &options.extra_roots {
        if fs.is_dir(extra) {
            read_app_directories(fs, extra, filter, options, &mut dirs);
        } else {
            warn!(path = ?extra, "extra directory not found; skipping");
        }
    }

    let mut seen = HashSet::new();
    dirs.retain(|d| seen.insert(d.clone()));

    WatchSet {
        dirs,
        main_files: main_files
            .iter()
            .filter(|f| !f.is_empty())
            .cloned()
            .collect(),
    }
}

fn read_app_directories(
    fs: &dyn FileSystem,
    dir: &Path,
    filter: &ChangeFilter,
    options: &DiscoveryOptions,
    out: &mut Vec<PathBuf>,
) {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(?dir, error = %err, "cannot read directory; skipping");
            return;
        }
    };

    let mut use_directory = false;
    for path in entries {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        if name.ends_with("docs") || name.ends_with("swagger") {
            continue;
        }
        if !options.watch_vendor && name.ends_with("vendor") {
            continue;
        }
        if is_excluded(&path, &options.excluded) {
            info!("'{}' is not being watched", path.display());
            continue;
        }

        if fs.is_dir(&path) && !name.starts_with('.') {
            read_app_directories(fs, &path, filter, options, out);
            continue;
        }

        if use_directory {
            continue;
        }

        if filter.class_of_name(&name).is_some() {
            out.push(dir.to_path_buf());
            use_directory = true;
        }
    }
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded.iter().any(|ex| path.starts_with(ex))
}
