// src/reload/hub.rs

//! Fan-out of reload messages to connected clients.
//!
//! A single task owns the client set and processes register, unregister and
//! broadcast intents in arrival order, so the set needs no lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outbound queue size per client. A client this far behind is dropped.
pub const CLIENT_QUEUE_CAPACITY: usize = 256;

const HUB_COMMAND_CAPACITY: usize = 64;

pub type ClientId = u64;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// The hub's side of one client: the sending half of its outbound queue.
///
/// Dropping it closes the queue, which the client's write pump turns into
/// a close frame.
#[derive(Debug)]
pub struct ClientHandle {
    id: ClientId,
    tx: mpsc::Sender<String>,
}

impl ClientHandle {
    /// New client with a fresh id, plus the receiving end of its queue.
    pub fn new() -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }
}

#[derive(Debug)]
pub enum HubCommand {
    Register(ClientHandle),
    Unregister(ClientId),
    Broadcast(String),
}

/// Hub state. Driven by [`ReloadHub::run`] in production; tests may call
/// [`ReloadHub::handle`] directly.
#[derive(Debug, Default)]
pub struct ReloadHub {
    clients: HashMap<ClientId, ClientHandle>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(client) => {
                debug!(client = client.id, "client registered");
                self.clients.insert(client.id, client);
            }
            HubCommand::Unregister(id) => {
                if self.clients.remove(&id).is_some() {
                    debug!(client = id, "client unregistered");
                }
            }
            HubCommand::Broadcast(message) => self.broadcast(&message),
        }
    }

    fn broadcast(&mut self, message: &str) {
        self.clients.retain(|id, client| match client.tx.try_send(message.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(client = id, "client queue full; disconnecting");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(client = id, "client queue closed; removing");
                false
            }
        });
    }

    /// Process commands until every [`HubHandle`] is dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<HubCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        debug!("reload hub stopped");
    }
}

/// Cloneable sender into the hub loop.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Returns `false` if the hub loop is gone.
    pub async fn register(&self, client: ClientHandle) -> bool {
        self.tx.send(HubCommand::Register(client)).await.is_ok()
    }

    pub async fn unregister(&self, id: ClientId) -> bool {
        self.tx.send(HubCommand::Unregister(id)).await.is_ok()
    }

    /// Queue `message` (trimmed) for every registered client.
    pub async fn broadcast(&self, message: impl AsRef<str>) -> bool {
        let message = message.as_ref().trim().to_string();
        self.tx.send(HubCommand::Broadcast(message)).await.is_ok()
    }
}

/// Start the hub loop on the current runtime.
pub fn spawn_hub() -> (HubHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(HUB_COMMAND_CAPACITY);
    let task = tokio::spawn(ReloadHub::new().run(rx));
    info!("reload hub started");
    (HubHandle { tx }, task)
}
