// src/exec/toolchain.rs

//! External build tool invocations.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{HotrunError, Result};
use crate::types::BuildStep;

/// Arguments for one compile invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    /// Output binary name, relative to the working directory.
    pub output: String,
    pub tags: Option<String>,
    pub ldflags: Option<String>,
    /// Explicit files; empty builds the package in the working directory.
    pub files: Vec<String>,
}

impl CompileRequest {
    /// `build -o <output> [-tags T] [-ldflags L] [files...]`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string(), "-o".to_string(), self.output.clone()];
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.is_empty()) {
            args.push("-tags".to_string());
            args.push(tags.to_string());
        }
        if let Some(ldflags) = self.ldflags.as_deref().filter(|l| !l.is_empty()) {
            args.push("-ldflags".to_string());
            args.push(ldflags.to_string());
        }
        args.extend(self.files.iter().cloned());
        args
    }
}

/// The three external steps of a build.
///
/// Production uses [`GoToolchain`]; tests substitute a fake that records
/// invocations.
pub trait Toolchain: Send + Sync {
    /// Warm the dependency cache. Failures are tolerated by the caller.
    fn pre_install(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    fn generate_docs(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Compile; on failure the error carries the captured stderr.
    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs the Go tool (or a compatible one) in the application directory.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    doc_command: Vec<String>,
    workdir: PathBuf,
}

impl GoToolchain {
    pub fn new(program: impl Into<String>, doc_command: Vec<String>, workdir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            doc_command,
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(&self.workdir)
            .env("GOGC", "off")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl Toolchain for GoToolchain {
    fn pre_install(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut cmd = self.command(&self.program);
            cmd.args(["install", "-v"])
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            debug!(program = %self.program, "running pre-install");
            let status = cmd.status().await.map_err(|e| HotrunError::Build {
                step: BuildStep::PreInstall,
                stderr: e.to_string(),
            })?;
            if status.success() {
                Ok(())
            } else {
                Err(HotrunError::Build {
                    step: BuildStep::PreInstall,
                    stderr: format!("exited with {status}"),
                })
            }
        })
    }

    fn generate_docs(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let Some((program, args)) = self.doc_command.split_first() else {
                return Err(HotrunError::ConfigError("doc_command is empty".to_string()));
            };
            info!("Generating the docs...");
            let mut cmd = self.command(program);
            cmd.args(args);
            run_captured(cmd, BuildStep::Docs).await?;
            info!("Docs generated!");
            Ok(())
        })
    }

    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = self.command(&self.program);
            cmd.args(request.args());
            debug!(program = %self.program, args = ?request.args(), "compiling");
            run_captured(cmd, BuildStep::Compile).await
        })
    }
}

/// Run to completion with stdout discarded and stderr captured for the
/// error report.
async fn run_captured(mut cmd: Command, step: BuildStep) -> Result<()> {
    cmd.stdout(Stdio::null()).stderr(Stdio::piped());
    let output = cmd.output().await.map_err(|e| HotrunError::Build {
        step,
        stderr: e.to_string(),
    })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(HotrunError::Build {
            step,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_args_omit_empty_flags() {
        let req = CompileRequest {
            output: "app".into(),
            tags: Some(String::new()),
            ldflags: None,
            files: vec![],
        };
        assert_eq!(req.args(), vec!["build", "-o", "app"]);
    }

    #[test]
    fn compile_args_full() {
        let req = CompileRequest {
            output: "app".into(),
            tags: Some("dev".into()),
            ldflags: Some("-s -w".into()),
            files: vec!["main.go".into(), "extra.go".into()],
        };
        assert_eq!(
            req.args(),
            vec!["build", "-o", "app", "-tags", "dev", "-ldflags", "-s -w", "main.go", "extra.go"]
        );
    }
}
