// tests/process_manager.rs

#![cfg(unix)]

use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

use hotrun::errors::HotrunError;
use hotrun::exec::{AppRunner, InterruptTerminator, KillTerminator, ProcessManager, KILL_TIMEOUT};
use hotrun_test_utils::{eventually, init_tracing};
use nix::sys::signal::kill;
use nix::unistd::Pid;

type TestResult = Result<(), Box<dyn Error>>;

const SH: &str = "/bin/sh";

fn shell(workdir: &Path, script: &str) -> ProcessManager {
    ProcessManager::new(
        workdir,
        vec!["-c".into(), script.into()],
        vec![("HOTRUN_TEST_VALUE".into(), "42".into())],
        Box::new(InterruptTerminator),
    )
}

fn alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[tokio::test]
async fn kill_without_process_is_a_noop() {
    init_tracing();
    let mut pm = shell(Path::new("/"), "exit 0");
    pm.kill().await;
    assert!(!pm.is_running());
}

#[tokio::test]
async fn restart_replaces_the_running_instance() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut pm = shell(dir.path(), "sleep 30");
    let mut started = pm.subscribe_started();

    pm.restart(Path::new(SH)).await?;
    let first = pm.pid().ok_or("no pid after start")?;
    assert_eq!(*started.borrow_and_update(), Some(first));

    pm.restart(Path::new(SH)).await?;
    let second = pm.pid().ok_or("no pid after restart")?;

    assert_ne!(first, second);
    assert!(!alive(first), "old instance must be gone before the new one starts");
    assert!(alive(second));
    assert_eq!(*started.borrow_and_update(), Some(second));

    pm.kill().await;
    assert!(!alive(second));
    Ok(())
}

#[tokio::test]
async fn interrupt_stops_a_cooperative_process_quickly() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut pm = shell(dir.path(), "sleep 30");
    pm.start(Path::new(SH))?;

    let begin = Instant::now();
    pm.kill().await;

    assert!(begin.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn stubborn_process_is_force_killed_after_timeout() -> TestResult {
    init_tracing();
    // Production grace period; shortened below to keep the test fast.
    assert_eq!(KILL_TIMEOUT, Duration::from_secs(10));
    let dir = tempfile::tempdir()?;
    let mut pm = shell(dir.path(), "trap '' INT; sleep 12; exit 0")
        .with_kill_timeout(Duration::from_millis(300));
    pm.start(Path::new(SH))?;
    let stubborn = pm.pid().ok_or("no pid")?;
    // Let the shell install its trap.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let begin = Instant::now();
    pm.restart(Path::new(SH)).await?;
    let waited = begin.elapsed();

    assert!(waited >= Duration::from_millis(300), "gave up early: {waited:?}");
    assert!(waited < Duration::from_secs(5), "not force-killed: {waited:?}");
    assert!(!alive(stubborn));
    assert!(pm.pid().is_some_and(|pid| pid != stubborn));

    pm.kill().await;
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_returned() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut pm = shell(dir.path(), "exit 0");

    let err = pm.restart(Path::new("does-not-exist")).await.unwrap_err();

    match err {
        HotrunError::Spawn { binary, .. } => assert_eq!(binary, dir.path().join("does-not-exist")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!pm.is_running());
    Ok(())
}

#[tokio::test]
async fn child_sees_extra_env_and_workdir() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut pm = shell(dir.path(), "echo \"$HOTRUN_TEST_VALUE\" > env.txt");

    pm.start(Path::new(SH))?;
    let out = dir.path().join("env.txt");
    let written = eventually(Duration::from_secs(3), || {
        std::fs::read_to_string(&out).is_ok_and(|s| s.trim() == "42")
    })
    .await;

    assert!(written);
    pm.kill().await;
    Ok(())
}

#[tokio::test]
async fn kill_terminator_stops_immediately() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut pm = ProcessManager::new(
        dir.path(),
        vec!["-c".into(), "trap '' INT; sleep 30".into()],
        vec![],
        Box::new(KillTerminator),
    );
    pm.start(Path::new(SH))?;

    let begin = Instant::now();
    pm.kill().await;
    assert!(begin.elapsed() < Duration::from_secs(5));
    Ok(())
}
