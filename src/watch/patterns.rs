// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use regex::RegexSet;

use crate::config::ConfigFile;
use crate::types::ChangeClass;

/// File-name patterns produced by editors and generators that never
/// warrant a rebuild.
///
/// Matched against the final path component only.
pub const IGNORED_FILE_PATTERNS: &[&str] = &[
    // emacs lock files: .#main.go
    r"^\.#.+$",
    // emacs autosave: #main.go#
    r"^#.+#$",
    // vim swap files: .main.go.swp / .swo / .swx
    r"^\..+\.sw[a-px]$",
    // backup files: main.go~
    r"~$",
    r"\.tmp$",
    // generated router file, rewritten by the doc generator on every build
    r"^commentsRouter_controllers\.go$",
];

/// Compiled filtering and classification rules for change events.
///
/// Built once at startup; the ignore patterns are compiled into a single
/// [`RegexSet`] and reused for every event.
#[derive(Clone)]
pub struct ChangeFilter {
    ignored: RegexSet,
    source_exts: Vec<String>,
    static_exts: Vec<String>,
    reload_enabled: bool,
}

impl fmt::Debug for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFilter")
            .field("source_exts", &self.source_exts)
            .field("static_exts", &self.static_exts)
            .field("reload_enabled", &self.reload_enabled)
            .finish_non_exhaustive()
    }
}

impl ChangeFilter {
    pub fn new(
        source_exts: Vec<String>,
        static_exts: Vec<String>,
        reload_enabled: bool,
    ) -> Result<Self> {
        let ignored = RegexSet::new(IGNORED_FILE_PATTERNS)
            .context("compiling ignored file patterns")?;
        Ok(Self {
            ignored,
            source_exts,
            static_exts,
            reload_enabled,
        })
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(
            cfg.watch.extensions.clone(),
            cfg.watch.static_extensions.clone(),
            cfg.reload.enabled,
        )
    }

    pub fn reload_enabled(&self) -> bool {
        self.reload_enabled
    }

    /// True for editor swap/backup files and the generated router file.
    pub fn is_ignored(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.ignored.is_match(&name.to_string_lossy()),
            None => false,
        }
    }

    /// Classify by suffix alone, without the ignore rules.
    ///
    /// Static assets only count while live reload is enabled; otherwise a
    /// name must carry one of the watched source extensions.
    pub fn class_of_name(&self, name: &str) -> Option<ChangeClass> {
        if self.reload_enabled && has_any_suffix(name, &self.static_exts) {
            return Some(ChangeClass::Static);
        }
        if has_any_suffix(name, &self.source_exts) {
            return Some(ChangeClass::Source);
        }
        None
    }

    /// Full classification of a changed path: `None` means drop silently.
    pub fn classify(&self, path: &Path) -> Option<ChangeClass> {
        if self.is_ignored(path) {
            return None;
        }
        self.class_of_name(&path.to_string_lossy())
    }
}

fn has_any_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s.as_str()))
}
