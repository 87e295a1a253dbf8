//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the session handle that commands are forwarded
//! through, the broadcast channel feeding `WebSocket` clients, and the last
//! published [`GameSnapshot`]. The session task fills the latter two after
//! every change; handlers never touch session state directly.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use village_core::runner::SessionHandle;
use village_types::GameSnapshot;

/// Capacity of the broadcast channel for state snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the running session.
    pub session: SessionHandle,
    /// Broadcast sender for state snapshots.
    pub tx: broadcast::Sender<GameSnapshot>,
    /// The most recently published snapshot, `None` before the first one.
    pub snapshot: Arc<RwLock<Option<GameSnapshot>>>,
}

impl AppState {
    /// Create application state around a session handle.
    pub fn new(session: SessionHandle) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            session,
            tx,
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Subscribe to the snapshot broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<GameSnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, snapshot: &GameSnapshot) -> usize {
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }

    /// The last published snapshot, if any.
    pub async fn latest(&self) -> Option<GameSnapshot> {
        self.snapshot.read().await.clone()
    }
}
