//! `WebSocket` handler for real-time state streaming.
//!
//! Clients connect to `GET /ws/state`, immediately receive the last
//! published [`GameSnapshot`](village_types::GameSnapshot) (if any), and
//! then one JSON text frame per change. If a client falls behind, lagged
//! messages are skipped; every frame is a full snapshot so nothing is lost
//! by skipping.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use village_types::GameSnapshot;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshots.
///
/// # Route
///
/// `GET /ws/state`
pub async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize and send one snapshot. Returns `false` once the client is
/// gone.
async fn send_snapshot(socket: &mut WebSocket, snapshot: &GameSnapshot) -> bool {
    let json = match serde_json::to_string(snapshot) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize snapshot: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the cache so no update falls in between.
    let mut rx = state.subscribe();
    if let Some(current) = state.latest().await
        && !send_snapshot(&mut socket, &current).await
    {
        debug!("WebSocket client disconnected (initial send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(snapshot) => {
                        if !send_snapshot(&mut socket, &snapshot).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Client-to-server frames carry no meaning here.
                    _ => {}
                }
            }
        }
    }
}
