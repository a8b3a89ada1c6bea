// tests/runtime_fake_dispatcher.rs

use std::error::Error;
use std::time::{Duration, SystemTime};

use hotrun::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use hotrun::reload::{spawn_hub, ClientHandle};
use hotrun::types::{ChangeEvent, ChangeKind};
use hotrun::watch::ChangeFilter;
use hotrun_test_utils::{init_tracing, ConfigFileBuilder, FakeDispatcher};
use tokio::sync::mpsc;
use tokio::time::timeout;

type TestResult = Result<(), Box<dyn Error>>;

const WINDOW: Duration = Duration::from_millis(80);

fn core(reload: bool) -> CoreRuntime {
    let cfg = ConfigFileBuilder::new().with_reload(reload).build();
    CoreRuntime::new(
        ChangeFilter::from_config(&cfg).unwrap(),
        RuntimeOptions {
            debounce_window: WINDOW,
            ..RuntimeOptions::default()
        },
    )
}

fn change(path: &str, secs: u64) -> RuntimeEvent {
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    RuntimeEvent::FileChanged(ChangeEvent::new(path, ChangeKind::Write, Some(mtime)))
}

#[tokio::test]
async fn source_save_dispatches_exactly_one_build() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel(16);
    let (dispatcher, mut jobs) = FakeDispatcher::new();
    let runtime = Runtime::new(core(false), rt_rx, dispatcher, None);
    let handle = tokio::spawn(runtime.run());

    rt_tx.send(change("/app/main.go", 1)).await?;

    let job = timeout(Duration::from_secs(2), jobs.recv())
        .await?
        .ok_or("dispatcher dropped")?;
    assert_eq!(job.reason, r#"WRITE "/app/main.go""#);

    // Nothing else follows.
    assert!(timeout(WINDOW * 3, jobs.recv()).await.is_err());

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    timeout(Duration::from_secs(2), handle).await???;
    Ok(())
}

#[tokio::test]
async fn burst_of_saves_coalesces() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel(16);
    let (dispatcher, mut jobs) = FakeDispatcher::new();
    tokio::spawn(Runtime::new(core(false), rt_rx, dispatcher, None).run());

    for i in 0..5 {
        rt_tx.send(change("/app/main.go", i + 1)).await?;
        tokio::time::sleep(WINDOW / 4).await;
    }

    let job = timeout(Duration::from_secs(2), jobs.recv())
        .await?
        .ok_or("dispatcher dropped")?;
    assert_eq!(job.reason, r#"WRITE "/app/main.go""#);
    assert!(timeout(WINDOW * 3, jobs.recv()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn static_save_reloads_clients_without_building() -> TestResult {
    init_tracing();

    let (hub, _hub_task) = spawn_hub();
    let (client, mut inbox) = ClientHandle::new();
    assert!(hub.register(client).await);

    let (rt_tx, rt_rx) = mpsc::channel(16);
    let (dispatcher, mut jobs) = FakeDispatcher::new();
    tokio::spawn(Runtime::new(core(true), rt_rx, dispatcher, Some(hub.clone())).run());

    rt_tx.send(change("/app/static/site.css", 1)).await?;

    let message = timeout(Duration::from_secs(2), inbox.recv())
        .await?
        .ok_or("client queue closed")?;
    assert_eq!(message, r#"WRITE "/app/static/site.css""#);
    assert!(timeout(WINDOW * 3, jobs.recv()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn closed_channel_ends_the_runtime() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel(1);
    let (dispatcher, _jobs) = FakeDispatcher::new();
    let handle = tokio::spawn(Runtime::new(core(false), rt_rx, dispatcher, None).run());

    drop(rt_tx);
    timeout(Duration::from_secs(2), handle).await???;
    Ok(())
}
