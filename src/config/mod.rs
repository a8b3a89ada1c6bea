// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde structs mirroring `Hotrun.toml`.
//! - [`loader`] reads the file (or falls back to defaults).
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_for_app, DEFAULT_CONFIG_FILE};
pub use model::{
    BuildSection, ConfigFile, NotifySection, RawConfigFile, ReloadSection, RunSection,
    WatchSection,
};
