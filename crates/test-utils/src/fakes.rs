//! In-process stand-ins for the toolchain, the application runner, the
//! notifier and the build dispatcher.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hotrun::errors::{HotrunError, Result};
use hotrun::exec::{AppRunner, BuildDispatcher, CompileRequest, Toolchain};
use hotrun::notify_desktop::Notifier;
use hotrun::types::{BuildJob, BuildStep};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    PreInstall,
    Docs,
    Compile(CompileRequest),
}

#[derive(Debug, Default)]
struct ToolchainState {
    calls: Vec<ToolCall>,
    compile_intervals: Vec<(Instant, Instant)>,
    compile_failure: Option<String>,
    docs_fail: bool,
    compile_delay: Duration,
}

/// A toolchain that records every call instead of running a compiler.
///
/// Clones share state: box one clone into the supervisor, keep another for
/// assertions.
#[derive(Debug, Clone, Default)]
pub struct FakeToolchain {
    state: Arc<Mutex<ToolchainState>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compile_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().compile_delay = delay;
        self
    }

    pub fn failing_docs(self) -> Self {
        self.state.lock().unwrap().docs_fail = true;
        self
    }

    /// Make subsequent compiles fail with `stderr` (or succeed with `None`).
    pub fn set_compile_failure(&self, stderr: Option<&str>) {
        self.state.lock().unwrap().compile_failure = stderr.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn compile_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, ToolCall::Compile(_)))
            .count()
    }

    pub fn compile_intervals(&self) -> Vec<(Instant, Instant)> {
        self.state.lock().unwrap().compile_intervals.clone()
    }
}

impl Toolchain for FakeToolchain {
    fn pre_install(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.state.lock().unwrap().calls.push(ToolCall::PreInstall);
        Box::pin(async { Ok(()) })
    }

    fn generate_docs(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let fail = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ToolCall::Docs);
            state.docs_fail
        };
        Box::pin(async move {
            if fail {
                Err(HotrunError::Build {
                    step: BuildStep::Docs,
                    stderr: "doc tool failed".into(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let (delay, failure) = {
                let mut state = self.state.lock().unwrap();
                state.calls.push(ToolCall::Compile(request.clone()));
                (state.compile_delay, state.compile_failure.clone())
            };
            let start = Instant::now();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let end = Instant::now();
            self.state.lock().unwrap().compile_intervals.push((start, end));

            match failure {
                Some(stderr) => Err(HotrunError::Build {
                    step: BuildStep::Compile,
                    stderr,
                }),
                None => Ok(()),
            }
        })
    }
}

#[derive(Debug, Default)]
struct RunnerState {
    restarts: Vec<PathBuf>,
    fail_start: bool,
}

/// Records restarts instead of spawning processes.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<RunnerState>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start(self) -> Self {
        self.state.lock().unwrap().fail_start = true;
        self
    }

    pub fn restarts(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().restarts.clone()
    }

    pub fn restart_count(&self) -> usize {
        self.state.lock().unwrap().restarts.len()
    }
}

impl AppRunner for FakeRunner {
    fn restart<'a>(
        &'a mut self,
        binary: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let fail = {
            let mut state = self.state.lock().unwrap();
            state.restarts.push(binary.to_path_buf());
            state.fail_start
        };
        Box::pin(async move {
            if fail {
                Err(HotrunError::Spawn {
                    binary: binary.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary"),
                })
            } else {
                Ok(())
            }
        })
    }
}

/// Keeps every `(text, title)` pair it is asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, text: &str, title: &str) {
        self.seen
            .lock()
            .unwrap()
            .push((text.to_string(), title.to_string()));
    }
}

/// A dispatcher that forwards jobs to the test instead of building.
pub struct FakeDispatcher {
    tx: mpsc::UnboundedSender<BuildJob>,
}

impl FakeDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BuildJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BuildDispatcher for FakeDispatcher {
    fn dispatch(&mut self, job: BuildJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();
        Box::pin(async move {
            tx.send(job)
                .map_err(|e| HotrunError::Other(anyhow::anyhow!("test receiver dropped: {e}")))?;
            Ok(())
        })
    }
}
