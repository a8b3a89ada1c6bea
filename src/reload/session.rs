// src/reload/session.rs

//! One websocket peer: a read pump for liveness and a write pump fed by the
//! client's hub queue.

use std::fmt::Display;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::debug;

use crate::reload::hub::{ClientHandle, HubHandle};

pub const WRITE_WAIT: Duration = Duration::from_secs(10);
pub const PONG_WAIT: Duration = Duration::from_secs(60);
/// Must stay below [`PONG_WAIT`] so peers see traffic before timing out.
pub const PING_PERIOD: Duration = Duration::from_secs(54);

/// Separator used when several queued messages go out as one frame.
pub const MESSAGE_SEPARATOR: char = '\n';

#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub write_wait: Duration,
    pub ping_period: Duration,
    /// Longest silence tolerated from the peer before the session ends.
    pub pong_wait: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            write_wait: WRITE_WAIT,
            ping_period: PING_PERIOD,
            pong_wait: PONG_WAIT,
        }
    }
}

/// Why the read pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerGone {
    /// Peer sent a close frame.
    Closed,
    /// Stream ended without a close frame.
    Eof,
    ReadError,
    /// Nothing arrived within the pong wait.
    TimedOut,
}

/// Why the write pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterDone {
    /// Hub closed the queue; a close frame was sent.
    QueueClosed,
    WriteFailed,
}

/// Serve one upgraded connection until either side gives up.
pub async fn serve_client(socket: WebSocket, hub: HubHandle, timings: SessionTimings) {
    let (client, queue) = ClientHandle::new();
    let id = client.id();
    if !hub.register(client).await {
        debug!(client = id, "reload hub is gone; dropping connection");
        return;
    }
    debug!(client = id, "reload client connected");

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_pump(sink, queue, timings));

    tokio::select! {
        gone = read_pump(stream, timings.pong_wait) => {
            debug!(client = id, ?gone, "reload client read side finished");
            hub.unregister(id).await;
            // The hub dropped our queue; the writer sends close and exits.
            let _ = writer.await;
        }
        done = &mut writer => {
            debug!(client = id, ?done, "reload client write side finished");
            hub.unregister(id).await;
        }
    }
}

/// Read frames only to notice close, failure or silence; content is
/// discarded. Any frame, pongs included, resets the `pong_wait` deadline.
pub async fn read_pump<St, E>(mut stream: St, pong_wait: Duration) -> PeerGone
where
    St: Stream<Item = std::result::Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let Ok(next) = timeout(pong_wait, stream.next()).await else {
            debug!(?pong_wait, "reload client went silent");
            return PeerGone::TimedOut;
        };
        let Some(frame) = next else {
            return PeerGone::Eof;
        };
        match frame {
            Ok(Message::Close(_)) => return PeerGone::Closed,
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "reload client read error");
                return PeerGone::ReadError;
            }
        }
    }
}

/// Forward queued messages as text frames and keep the peer alive with
/// pings.
///
/// Messages already waiting when one is sent are joined into the same frame.
pub async fn write_pump<S>(mut sink: S, mut queue: mpsc::Receiver<String>, timings: SessionTimings) -> WriterDone
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ping = interval_at(Instant::now() + timings.ping_period, timings.ping_period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = queue.recv() => {
                let Some(mut payload) = next else {
                    let _ = write_frame(&mut sink, Message::Close(None), timings.write_wait).await;
                    return WriterDone::QueueClosed;
                };
                while let Ok(more) = queue.try_recv() {
                    payload.push(MESSAGE_SEPARATOR);
                    payload.push_str(&more);
                }
                if let Err(err) = write_frame(&mut sink, Message::Text(payload.into()), timings.write_wait).await {
                    debug!(error = %err, "reload client write failed");
                    return WriterDone::WriteFailed;
                }
            }
            _ = ping.tick() => {
                if let Err(err) = write_frame(&mut sink, Message::Ping(Bytes::new()), timings.write_wait).await {
                    debug!(error = %err, "reload client ping failed");
                    return WriterDone::WriteFailed;
                }
            }
        }
    }
}

async fn write_frame<S>(sink: &mut S, frame: Message, write_wait: Duration) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match timeout(write_wait, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(anyhow!("{err}")),
        Err(_) => Err(anyhow!("write deadline of {write_wait:?} exceeded")),
    }
}
