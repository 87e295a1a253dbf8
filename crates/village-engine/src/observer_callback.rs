//! Session callback that updates the Observer API state.
//!
//! After each change, this callback caches the new `GameSnapshot` in
//! [`AppState`] and broadcasts it to all connected `WebSocket` clients.

use std::sync::Arc;

use tracing::debug;
use village_core::runner::{SessionCallback, SessionUpdate};
use village_observer::state::AppState;

/// Callback that bridges the session task to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl SessionCallback for ObserverCallback {
    fn on_update(&mut self, update: &SessionUpdate<'_>) {
        let receivers = self.state.broadcast(update.snapshot);
        debug!(cause = ?update.cause, receivers, "Snapshot broadcast sent");

        // Use try_write to avoid blocking the session task. If a REST
        // handler holds the read lock, skip this update; the next one
        // will catch up.
        if let Ok(mut cached) = self.state.snapshot.try_write() {
            *cached = Some(update.snapshot.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use village_core::config::GameConfig;
    use village_core::runner::{UpdateCause, session_channel};
    use village_core::session::Session;
    use village_types::ResourceKind;

    use super::*;

    #[tokio::test]
    async fn update_is_cached_and_broadcast() {
        let (handle, _rx) = session_channel(1);
        let state = Arc::new(AppState::new(handle));
        let mut subscriber = state.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&state));

        let config = GameConfig::default();
        let mut session = Session::new(&config, Utc::now()).unwrap();
        session.gather(ResourceKind::Gold, Utc::now());
        let snapshot = session.snapshot(Utc::now());
        let saved = session.saved_game();
        callback.on_update(&SessionUpdate {
            cause: UpdateCause::Command,
            snapshot: &snapshot,
            clock: session.clock_snapshot(),
            saved: &saved,
        });

        assert_eq!(state.latest().await, Some(snapshot.clone()));
        assert_eq!(subscriber.recv().await.unwrap(), snapshot);
    }
}
