// tests/reload_server.rs

use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use hotrun::reload::{spawn_hub, start_reload_server, RELOAD_PATH};
use hotrun_test_utils::init_tracing;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

type TestResult = Result<(), Box<dyn Error>>;

const STEP: Duration = Duration::from_secs(2);

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Read until the end of the HTTP response head.
async fn read_head(stream: &mut TcpStream) -> Result<String, Box<dyn Error>> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = timeout(STEP, stream.read(&mut byte)).await??;
        if n == 0 {
            break;
        }
        head.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

#[tokio::test]
async fn plain_request_is_rejected() -> TestResult {
    init_tracing();
    let (hub, _hub_task) = spawn_hub();
    let (addr, _server) = start_reload_server(hub, loopback()).await.ok_or("bind failed")?;

    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {RELOAD_PATH} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let head = read_head(&mut stream).await?;
    assert!(head.starts_with("HTTP/1.1 4"), "unexpected response: {head}");
    Ok(())
}

#[tokio::test]
async fn bind_failure_is_not_fatal() -> TestResult {
    init_tracing();
    let (hub, _hub_task) = spawn_hub();
    let (addr, _server) = start_reload_server(hub.clone(), loopback()).await.ok_or("bind failed")?;

    assert!(start_reload_server(hub, addr).await.is_none());
    Ok(())
}

#[tokio::test]
async fn upgraded_client_receives_broadcasts() -> TestResult {
    init_tracing();
    let (hub, _hub_task) = spawn_hub();
    let (addr, _server) = start_reload_server(hub.clone(), loopback()).await.ok_or("bind failed")?;

    let mut stream = TcpStream::connect(addr).await?;
    let request = format!(
        "GET {RELOAD_PATH} HTTP/1.1\r\n\
         Host: localhost\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;
    let head = read_head(&mut stream).await?;
    assert!(head.starts_with("HTTP/1.1 101"), "unexpected response: {head}");

    // Registration races the handshake; keep broadcasting until a frame lands.
    let mut header = [0u8; 2];
    let mut received = false;
    for _ in 0..40 {
        hub.broadcast("reload").await;
        if let Ok(read) = timeout(Duration::from_millis(50), stream.read_exact(&mut header)).await {
            read?;
            received = true;
            break;
        }
    }
    assert!(received, "no frame received");

    // Unmasked server text frame, FIN set.
    assert_eq!(header[0], 0x81);
    let len = usize::from(header[1] & 0x7f);
    assert!(len < 126);
    let mut payload = vec![0u8; len];
    timeout(STEP, stream.read_exact(&mut payload)).await??;
    assert!(String::from_utf8(payload)?.starts_with("reload"));
    Ok(())
}
