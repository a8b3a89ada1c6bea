// src/reload/mod.rs

//! Live reload over websockets.
//!
//! - [`hub`] is the single-owner fan-out loop tracking connected clients.
//! - [`session`] bridges one websocket peer to its hub queue.
//! - [`server`] exposes the upgrade endpoint with axum.

pub mod hub;
pub mod server;
pub mod session;

pub use hub::{spawn_hub, ClientHandle, ClientId, HubCommand, HubHandle, ReloadHub, CLIENT_QUEUE_CAPACITY};
pub use server::{reload_router, start_reload_server, RELOAD_ADDR, RELOAD_PATH, RELOAD_PORT};
pub use session::{read_pump, serve_client, write_pump, PeerGone, SessionTimings, WriterDone};
