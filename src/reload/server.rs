// src/reload/server.rs

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::reload::hub::HubHandle;
use crate::reload::session::{serve_client, SessionTimings};

pub const RELOAD_PATH: &str = "/reload";
pub const RELOAD_PORT: u16 = 12450;
pub const RELOAD_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, RELOAD_PORT));

/// Router with the single websocket endpoint.
pub fn reload_router(hub: HubHandle) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(reload_handler))
        .with_state(hub)
}

async fn reload_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(hub): State<HubHandle>,
) -> Response {
    match upgrade {
        Ok(ws) => ws
            .on_upgrade(move |socket| serve_client(socket, hub, SessionTimings::default()))
            .into_response(),
        Err(rejection) => {
            warn!(error = %rejection, "reload upgrade rejected");
            rejection.into_response()
        }
    }
}

/// Bind `addr` and serve the reload endpoint in the background.
///
/// A bind failure is logged and yields `None`; the orchestrator keeps
/// running without reload clients.
pub async fn start_reload_server(hub: HubHandle, addr: SocketAddr) -> Option<(SocketAddr, JoinHandle<()>)> {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to start live reload server");
            return None;
        }
    };
    let local = listener.local_addr().unwrap_or(addr);
    info!("live reload listening on ws://{local}{RELOAD_PATH}");

    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, reload_router(hub)).await {
            error!(error = %err, "live reload server stopped");
        }
    });
    Some((local, task))
}
