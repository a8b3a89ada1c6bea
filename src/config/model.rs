// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// extensions = [".go"]
/// static_extensions = [".html", ".tpl", ".js", ".css"]
///
/// [build]
/// tags = "integration"
/// pre_install = false
///
/// [run]
/// args = ["-port", "8080"]
/// envs = ["APP_ENV=dev"]
///
/// [reload]
/// enabled = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub reload: ReloadSection,

    #[serde(default)]
    pub notify: NotifySection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub build: BuildSection,
    pub run: RunSection,
    pub reload: ReloadSection,
    pub notify: NotifySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            watch: raw.watch,
            build: raw.build,
            run: raw.run,
            reload: raw.reload,
            notify: raw.notify,
        }
    }

    /// `[run].envs` split into `(key, value)` pairs.
    ///
    /// Entries are validated to contain `=`, so nothing is dropped here.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.run
            .envs
            .iter()
            .filter_map(|entry| entry.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Suffixes of source files that trigger a rebuild.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Suffixes of asset files that only trigger a client reload
    /// (when `[reload].enabled`).
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// Extra directories watched as-is, in addition to the discovered layout.
    #[serde(default)]
    pub others: Vec<String>,

    /// Whether `vendor/` directories are walked during discovery.
    #[serde(default)]
    pub watch_vendor: bool,
}

fn default_extensions() -> Vec<String> {
    vec![".go".to_string()]
}

fn default_static_extensions() -> Vec<String> {
    [".html", ".tpl", ".js", ".css"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            static_extensions: default_static_extensions(),
            others: Vec::new(),
            watch_vendor: false,
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// External build tool, invoked as `<tool> build ...`.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Run `<tool> install -v` before each build to warm the cache.
    #[serde(default = "default_true")]
    pub pre_install: bool,

    /// Passed through as `-tags`; empty means omitted.
    #[serde(default)]
    pub tags: String,

    /// Passed through as `-ldflags`; empty means omitted.
    #[serde(default)]
    pub ldflags: String,

    /// Command line used for documentation generation.
    #[serde(default = "default_doc_command")]
    pub doc_command: Vec<String>,
}

fn default_tool() -> String {
    "go".to_string()
}

fn default_true() -> bool {
    true
}

fn default_doc_command() -> Vec<String> {
    ["bee", "generate", "docs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            pre_install: true,
            tags: String::new(),
            ldflags: String::new(),
            doc_command: default_doc_command(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Default arguments for the application, used unless `--runargs` is given.
    #[serde(default)]
    pub args: Vec<String>,

    /// `KEY=VALUE` pairs added on top of the inherited environment.
    #[serde(default)]
    pub envs: Vec<String>,
}

/// `[reload]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReloadSection {
    #[serde(default)]
    pub enabled: bool,
}

/// `[notify]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySection {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self { enabled: true }
    }
}
