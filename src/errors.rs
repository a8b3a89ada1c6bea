// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::BuildStep;

#[derive(Error, Debug)]
pub enum HotrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A directory of the watch set could not be subscribed to at startup.
    #[error("failed to watch {path:?}: {source}")]
    WatchInit {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// An external build step exited non-zero.
    #[error("{step} step failed: {stderr}")]
    Build { step: BuildStep, stderr: String },

    #[error("failed to start {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotrunError>;
