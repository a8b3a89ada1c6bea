use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::extract::ws::Message;
use futures_util::Sink;

#[derive(Debug, Default)]
struct SinkState {
    frames: Vec<Message>,
    broken: bool,
}

/// A websocket sink that stores frames; can be switched to fail like a
/// dead peer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn break_pipe(&self) {
        self.state.lock().unwrap().broken = true;
    }

    pub fn frames(&self) -> Vec<Message> {
        self.state.lock().unwrap().frames.clone()
    }

    /// Payloads of the text frames, in order.
    pub fn texts(&self) -> Vec<String> {
        self.frames()
            .into_iter()
            .filter_map(|m| match m {
                Message::Text(t) => Some(t.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn ping_count(&self) -> usize {
        self.frames()
            .iter()
            .filter(|m| matches!(m, Message::Ping(_)))
            .count()
    }

    pub fn saw_close(&self) -> bool {
        self.frames().iter().any(|m| matches!(m, Message::Close(_)))
    }
}

impl Sink<Message> for RecordingSink {
    type Error = io::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        }
        state.frames.push(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}
