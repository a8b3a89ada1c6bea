// src/exec/process.rs

//! Lifecycle of the single running application instance.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::errors::{HotrunError, Result};

/// How long a graceful stop may take before the process is force-killed.
pub const KILL_TIMEOUT: Duration = Duration::from_secs(10);

/// Platform capability for ending a child process.
pub trait Terminator: Send + Sync + fmt::Debug {
    /// Ask the process to exit on its own.
    fn request_stop(&self, child: &mut Child) -> io::Result<()>;

    /// End the process unconditionally.
    fn force_stop(&self, child: &mut Child) -> io::Result<()> {
        child.start_kill()
    }
}

/// Sends SIGINT, so the application can run its own shutdown hooks.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct InterruptTerminator;

#[cfg(unix)]
impl Terminator for InterruptTerminator {
    fn request_stop(&self, child: &mut Child) -> io::Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Already reaped.
        let Some(pid) = child.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        kill(Pid::from_raw(pid), Signal::SIGINT).map_err(io::Error::from)
    }
}

/// No cooperative signal available: both operations kill.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillTerminator;

impl Terminator for KillTerminator {
    fn request_stop(&self, child: &mut Child) -> io::Result<()> {
        child.start_kill()
    }
}

/// The terminator for the platform we were compiled for.
pub fn platform_terminator() -> Box<dyn Terminator> {
    #[cfg(unix)]
    {
        Box::new(InterruptTerminator)
    }
    #[cfg(not(unix))]
    {
        Box::new(KillTerminator)
    }
}

/// Something that can replace the running application with a fresh build.
///
/// Implemented by [`ProcessManager`]; tests substitute a recorder.
pub trait AppRunner: Send + Sync {
    fn restart<'a>(
        &'a mut self,
        binary: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Owns at most one live child process.
///
/// Callers serialize `restart`; the manager itself does no locking.
pub struct ProcessManager {
    workdir: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    kill_timeout: Duration,
    terminator: Box<dyn Terminator>,
    child: Option<Child>,
    started_tx: watch::Sender<Option<u32>>,
}

impl fmt::Debug for ProcessManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessManager")
            .field("workdir", &self.workdir)
            .field("args", &self.args)
            .field("pid", &self.pid())
            .finish_non_exhaustive()
    }
}

impl ProcessManager {
    pub fn new(
        workdir: impl Into<PathBuf>,
        args: Vec<String>,
        envs: Vec<(String, String)>,
        terminator: Box<dyn Terminator>,
    ) -> Self {
        let (started_tx, _) = watch::channel(None);
        Self {
            workdir: workdir.into(),
            args,
            envs,
            kill_timeout: KILL_TIMEOUT,
            terminator,
            child: None,
            started_tx,
        }
    }

    pub fn with_kill_timeout(mut self, kill_timeout: Duration) -> Self {
        self.kill_timeout = kill_timeout;
        self
    }

    /// Pid of the instance started most recently, published after each
    /// successful spawn.
    pub fn subscribe_started(&self) -> watch::Receiver<Option<u32>> {
        self.started_tx.subscribe()
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the tracked process, if any.
    ///
    /// Graceful request first; after `kill_timeout` the process is
    /// force-killed. Signalling errors (typically "already exited") are
    /// logged and otherwise ignored.
    pub async fn kill(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        let pid = child.id();

        if let Err(err) = self.terminator.request_stop(&mut child) {
            debug!(?pid, error = %err, "graceful stop request failed");
        }

        match timeout(self.kill_timeout, child.wait()).await {
            Ok(Ok(status)) => debug!(?pid, %status, "application exited"),
            Ok(Err(err)) => warn!(?pid, error = %err, "waiting for application failed"),
            Err(_) => {
                info!(?pid, "Timeout. Force kill cmd process");
                if let Err(err) = self.terminator.force_stop(&mut child) {
                    warn!(?pid, error = %err, "force kill failed");
                }
                if let Err(err) = child.wait().await {
                    warn!(?pid, error = %err, "waiting for killed application failed");
                }
            }
        }
    }

    /// Spawn `binary` with the configured arguments and environment.
    ///
    /// Relative binaries resolve against the working directory.
    pub fn start(&mut self, binary: &Path) -> Result<()> {
        let program = if binary.is_relative() {
            self.workdir.join(binary)
        } else {
            binary.to_path_buf()
        };

        info!("Restarting '{}' ...", program.display());
        let child = Command::new(&program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| HotrunError::Spawn {
                binary: program.clone(),
                source,
            })?;

        let pid = child.id();
        self.child = Some(child);
        self.started_tx.send_replace(pid);
        info!(?pid, "'{}' is running...", program.display());
        Ok(())
    }
}

impl AppRunner for ProcessManager {
    fn restart<'a>(
        &'a mut self,
        binary: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.kill().await;
            self.start(binary)
        })
    }
}

/// Environment variable carrying `--runmode` to the application.
pub const RUNMODE_ENV: &str = "BEEGO_RUNMODE";

/// Arguments for the application: the `--runargs` override when it has any
/// content, the configured defaults otherwise.
pub fn resolve_run_args(override_args: Option<&str>, defaults: &[String]) -> Vec<String> {
    match override_args.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => split_run_args(raw),
        None => defaults.to_vec(),
    }
}

/// Extra environment for the application, with the run mode appended last.
pub fn child_envs(mut envs: Vec<(String, String)>, runmode: Option<&str>) -> Vec<(String, String)> {
    if let Some(mode) = runmode.filter(|m| !m.is_empty()) {
        envs.push((RUNMODE_ENV.to_string(), mode.to_string()));
    }
    envs
}

/// Split a `--runargs` string into arguments.
///
/// Whitespace separates arguments unless inside single or double quotes;
/// the surrounding quotes of a quoted argument are removed.
pub fn split_run_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '\'' || c == '"' {
            chars.next();
            let mut closed = false;
            for next in chars.by_ref() {
                if next == c {
                    closed = true;
                    break;
                }
                token.push(next);
            }
            // Unterminated quote: keep it literally.
            if !closed {
                token.insert(0, c);
            }
        } else {
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                token.push(next);
                chars.next();
            }
        }
        args.push(token);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_and_quoted() {
        assert_eq!(
            split_run_args(r#"-port 8080 -name 'my app' -msg "hi there""#),
            vec!["-port", "8080", "-name", "my app", "-msg", "hi there"]
        );
    }

    #[test]
    fn split_empty() {
        assert!(split_run_args("   ").is_empty());
    }

    #[test]
    fn unterminated_quote_is_kept() {
        assert_eq!(split_run_args("a 'b c"), vec!["a", "'b c"]);
    }

    #[test]
    fn blank_override_falls_back_to_defaults() {
        let defaults = vec!["-port".to_string(), "8080".to_string()];
        assert_eq!(resolve_run_args(None, &defaults), defaults);
        assert_eq!(resolve_run_args(Some(""), &defaults), defaults);
        assert_eq!(resolve_run_args(Some("  \t "), &defaults), defaults);
        assert_eq!(resolve_run_args(Some("-debug"), &defaults), vec!["-debug"]);
    }

    #[test]
    fn runmode_is_appended_after_configured_envs() {
        let envs = vec![("APP_ENV".to_string(), "dev".to_string())];
        assert_eq!(
            child_envs(envs.clone(), Some("prod")),
            vec![
                ("APP_ENV".to_string(), "dev".to_string()),
                (RUNMODE_ENV.to_string(), "prod".to_string()),
            ]
        );
        assert_eq!(child_envs(envs.clone(), None), envs);
        assert_eq!(child_envs(envs.clone(), Some("")), envs);
    }

    #[test]
    fn empty_quotes_give_empty_argument() {
        assert_eq!(split_run_args(r#"a "" b"#), vec!["a", "", "b"]);
    }
}
