// tests/reload_hub.rs

use std::error::Error;
use std::time::Duration;

use hotrun::reload::{spawn_hub, ClientHandle, CLIENT_QUEUE_CAPACITY};
use hotrun_test_utils::init_tracing;
use tokio::time::timeout;

type TestResult = Result<(), Box<dyn Error>>;

const STEP: Duration = Duration::from_secs(2);

#[tokio::test]
async fn broadcast_reaches_every_client_trimmed() -> TestResult {
    init_tracing();
    let (hub, _task) = spawn_hub();
    let mut inboxes = Vec::new();
    for _ in 0..3 {
        let (client, inbox) = ClientHandle::new();
        assert!(hub.register(client).await);
        inboxes.push(inbox);
    }

    assert!(hub.broadcast("  WRITE \"/app/main.go\"\n").await);

    for inbox in &mut inboxes {
        let got = timeout(STEP, inbox.recv()).await?.ok_or("queue closed")?;
        assert_eq!(got, "WRITE \"/app/main.go\"");
    }
    Ok(())
}

#[tokio::test]
async fn slow_client_is_dropped_others_keep_receiving() -> TestResult {
    init_tracing();
    let (hub, _task) = spawn_hub();
    let (slow, mut slow_inbox) = ClientHandle::new();
    let (healthy, mut healthy_inbox) = ClientHandle::new();
    assert!(hub.register(slow).await);
    assert!(hub.register(healthy).await);

    // Fill the slow client's queue; the healthy one keeps up.
    for i in 0..CLIENT_QUEUE_CAPACITY {
        hub.broadcast(format!("m{i}")).await;
        let got = timeout(STEP, healthy_inbox.recv()).await?.ok_or("queue closed")?;
        assert_eq!(got, format!("m{i}"));
    }

    hub.broadcast("overflow").await;
    let got = timeout(STEP, healthy_inbox.recv()).await?.ok_or("queue closed")?;
    assert_eq!(got, "overflow");

    // The slow client gets what fit, then its queue is closed.
    let mut drained = 0;
    while let Some(msg) = timeout(STEP, slow_inbox.recv()).await? {
        assert_ne!(msg, "overflow");
        drained += 1;
    }
    assert_eq!(drained, CLIENT_QUEUE_CAPACITY);

    hub.broadcast("after").await;
    let got = timeout(STEP, healthy_inbox.recv()).await?.ok_or("queue closed")?;
    assert_eq!(got, "after");
    Ok(())
}

#[tokio::test]
async fn unregister_closes_the_queue() -> TestResult {
    init_tracing();
    let (hub, _task) = spawn_hub();
    let (client, mut inbox) = ClientHandle::new();
    let id = client.id();
    assert!(hub.register(client).await);

    assert!(hub.unregister(id).await);
    assert!(hub.unregister(id).await);

    assert_eq!(timeout(STEP, inbox.recv()).await?, None);
    Ok(())
}
