// src/exec/mod.rs

//! Build and process execution layer.
//!
//! - [`toolchain`] invokes the external build tool (`Toolchain` trait and
//!   the production `GoToolchain`).
//! - [`supervisor`] runs build jobs under one exclusive lock and restarts
//!   the application on success.
//! - [`process`] owns the running application instance and the platform
//!   stop capability.
//! - [`backend`] provides the `BuildDispatcher` trait the runtime talks to,
//!   and the production `SupervisorDispatcher`.

pub mod backend;
pub mod process;
pub mod supervisor;
pub mod toolchain;

pub use backend::{BuildDispatcher, SupervisorDispatcher, RELOAD_SETTLE};
pub use process::{
    child_envs, platform_terminator, resolve_run_args, split_run_args, AppRunner, KillTerminator,
    ProcessManager, Terminator, KILL_TIMEOUT, RUNMODE_ENV,
};
#[cfg(unix)]
pub use process::InterruptTerminator;
pub use supervisor::{BuildSettings, BuildSupervisor, TITLE_BUILD_FAILED, TITLE_DOCS_FAILED, TITLE_START_FAILED};
pub use toolchain::{CompileRequest, GoToolchain, Toolchain};
