// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotrun`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hotrun",
    version,
    about = "Rebuild and restart an application when its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Application directory. Its last component names the binary.
    ///
    /// Default: the current working directory.
    #[arg(value_name = "APP_PATH")]
    pub app_path: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Hotrun.toml` in the application directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Explicit file to compile instead of the whole package (repeatable).
    #[arg(long = "main", value_name = "FILE")]
    pub main_files: Vec<String>,

    /// Regenerate API docs before every build.
    #[arg(long)]
    pub gendoc: bool,

    /// Build tags passed to the compiler.
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Linker flags passed to the compiler.
    #[arg(long, value_name = "FLAGS")]
    pub ldflags: Option<String>,

    /// Arguments for the application, as one quoted string.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub runargs: Option<String>,

    /// Run mode for the application, exported as `BEEGO_RUNMODE`.
    #[arg(long, value_name = "MODE")]
    pub runmode: Option<String>,

    /// Path to exclude from watching (repeatable).
    #[arg(short = 'e', long = "exclude", value_name = "PATH")]
    pub excluded: Vec<PathBuf>,

    /// Extra directory to walk and watch (repeatable).
    #[arg(long = "ex", value_name = "DIR")]
    pub extra_dirs: Vec<PathBuf>,

    /// Also watch `vendor/` directories.
    #[arg(long)]
    pub vendor: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve configuration and the watch set, print them, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
