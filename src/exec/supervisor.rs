// src/exec/supervisor.rs

//! The serialized build pipeline.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::errors::HotrunError;
use crate::exec::process::AppRunner;
use crate::exec::toolchain::{CompileRequest, Toolchain};
use crate::notify_desktop::Notifier;
use crate::types::{BuildJob, BuildOutcome};

pub const TITLE_BUILD_FAILED: &str = "Build Failed";
pub const TITLE_DOCS_FAILED: &str = "Failed to generate the docs.";
pub const TITLE_START_FAILED: &str = "Failed to start";

/// Per-application build parameters, fixed for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct BuildSettings {
    pub binary_name: String,
    pub tags: Option<String>,
    pub ldflags: Option<String>,
    pub pre_install: bool,
}

impl BuildSettings {
    /// Binary name with the platform executable suffix.
    pub fn output_name(&self) -> String {
        format!("{}{}", self.binary_name, std::env::consts::EXE_SUFFIX)
    }

    fn compile_request(&self, files: &[String]) -> CompileRequest {
        CompileRequest {
            output: self.output_name(),
            tags: self.tags.clone(),
            ldflags: self.ldflags.clone(),
            files: files.to_vec(),
        }
    }
}

/// Runs build jobs one at a time and restarts the application on success.
///
/// The runner sits behind the build lock: holding the lock is the only way
/// to touch the running process, so builds and restarts never overlap.
pub struct BuildSupervisor {
    toolchain: Box<dyn Toolchain>,
    runner: Mutex<Box<dyn AppRunner>>,
    notifier: Arc<dyn Notifier>,
    settings: BuildSettings,
}

impl fmt::Debug for BuildSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSupervisor")
            .field("settings", &self.settings)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl BuildSupervisor {
    pub fn new(
        toolchain: Box<dyn Toolchain>,
        runner: Box<dyn AppRunner>,
        notifier: Arc<dyn Notifier>,
        settings: BuildSettings,
    ) -> Self {
        Self {
            toolchain,
            runner: Mutex::new(runner),
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Run one job to completion. Waits for any job already in progress.
    ///
    /// Failures are reported through logging and the notifier; the outcome
    /// only tells the caller whether a reload is warranted.
    pub async fn run(&self, job: BuildJob) -> BuildOutcome {
        let mut runner = self.runner.lock().await;
        debug!(reason = %job.reason, "build lock acquired");

        if self.settings.pre_install {
            if let Err(err) = self.toolchain.pre_install().await {
                debug!(error = %err, "pre-install failed; continuing");
            }
        }

        if job.generate_docs {
            if let Err(err) = self.toolchain.generate_docs().await {
                error!(error = %err, "{TITLE_DOCS_FAILED}");
                self.notifier.notify("", TITLE_DOCS_FAILED);
                return BuildOutcome::BuildFailed;
            }
        }

        let request = self.settings.compile_request(&job.files);
        if let Err(err) = self.toolchain.compile(&request).await {
            let text = match &err {
                HotrunError::Build { stderr, .. } => stderr.clone(),
                other => other.to_string(),
            };
            error!("Failed to build the application: {text}");
            self.notifier.notify(&text, TITLE_BUILD_FAILED);
            return BuildOutcome::BuildFailed;
        }

        info!("Built Successfully!");

        let binary = PathBuf::from(request.output);
        if let Err(err) = runner.restart(&binary).await {
            error!(error = %err, "failed to start the application");
            self.notifier.notify(&err.to_string(), TITLE_START_FAILED);
            return BuildOutcome::StartFailed;
        }

        BuildOutcome::Success
    }
}
