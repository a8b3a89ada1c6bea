// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// File name looked up in the application directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Hotrun.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for an application directory.
///
/// - An explicit path must exist and parse.
/// - Otherwise `Hotrun.toml` in `app_dir` is used when present, and built-in
///   defaults when it is not.
pub fn load_for_app(explicit: Option<&Path>, app_dir: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let candidate = default_config_path(app_dir);
    if candidate.is_file() {
        debug!(path = ?candidate, "loading project config");
        load_and_validate(&candidate)
    } else {
        debug!(path = ?candidate, "no project config found; using defaults");
        Ok(ConfigFile::default())
    }
}

/// Location of the project config inside `app_dir`.
pub fn default_config_path(app_dir: &Path) -> PathBuf {
    app_dir.join(DEFAULT_CONFIG_FILE)
}
