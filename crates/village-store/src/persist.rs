//! Fire-and-forget persistence.
//!
//! The session task must never wait on storage. [`PersistCallback`] copies
//! each update into a bounded channel with `try_send`; if the channel is
//! full the write is dropped, since a later update carries the whole state
//! anyway. [`run_persister`] drains the channel on its own task, keeps only
//! the newest pending job, and logs write failures at `warn` without
//! stopping.
//!
//! ```text
//! session task --on_update--> PersistCallback --try_send--> mpsc
//!                                                           |
//!                             run_persister <---------------+
//!                                  |-- village:clock
//!                                  +-- village:state
//! ```

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use village_core::runner::{SessionCallback, SessionUpdate};
use village_core::session::SavedGame;
use village_types::ClockSnapshot;

use crate::store::StateStore;

/// One pending write of both persisted roots.
#[derive(Debug, Clone)]
pub struct PersistJob {
    /// Clock snapshot for `village:clock`.
    pub clock: ClockSnapshot,
    /// Saved game for `village:state`.
    pub saved: SavedGame,
}

/// Totals reported when the persister stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersisterStats {
    /// Jobs written (both keys attempted).
    pub jobs_written: u64,
    /// Jobs superseded by a newer one before being written.
    pub jobs_coalesced: u64,
    /// Individual key writes that failed.
    pub write_failures: u64,
}

/// [`SessionCallback`] that queues every update for persistence.
#[derive(Debug)]
pub struct PersistCallback {
    jobs: mpsc::Sender<PersistJob>,
    dropped: u64,
}

impl PersistCallback {
    /// Updates dropped because the channel was full or closed.
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl SessionCallback for PersistCallback {
    fn on_update(&mut self, update: &SessionUpdate<'_>) {
        let job = PersistJob {
            clock: update.clock,
            saved: update.saved.clone(),
        };
        match self.jobs.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped = self.dropped.saturating_add(1);
                debug!(cause = ?update.cause, "persist queue full, write dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped = self.dropped.saturating_add(1);
                if self.dropped == 1 {
                    warn!("persister has stopped, updates are no longer saved");
                }
            }
        }
    }
}

/// Spawn [`run_persister`] on its own task.
///
/// The task ends once the returned callback (and every clone of its
/// sender) is dropped and the queue has been flushed.
pub fn spawn_persister(
    store: StateStore,
    buffer: usize,
) -> (PersistCallback, JoinHandle<PersisterStats>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let handle = tokio::spawn(run_persister(store, rx));
    (
        PersistCallback {
            jobs: tx,
            dropped: 0,
        },
        handle,
    )
}

/// Write queued jobs until the channel closes.
pub async fn run_persister(
    store: StateStore,
    mut jobs: mpsc::Receiver<PersistJob>,
) -> PersisterStats {
    let mut stats = PersisterStats::default();
    info!(backend = store.backend_name(), "Persister started");

    while let Some(mut job) = jobs.recv().await {
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
            stats.jobs_coalesced = stats.jobs_coalesced.saturating_add(1);
        }

        if let Err(e) = store.save_clock(&job.clock).await {
            stats.write_failures = stats.write_failures.saturating_add(1);
            warn!(error = %e, "Failed to persist clock");
        }
        if let Err(e) = store.save_saved_game(&job.saved).await {
            stats.write_failures = stats.write_failures.saturating_add(1);
            warn!(error = %e, "Failed to persist game state");
        }
        stats.jobs_written = stats.jobs_written.saturating_add(1);
    }

    info!(
        jobs_written = stats.jobs_written,
        jobs_coalesced = stats.jobs_coalesced,
        write_failures = stats.write_failures,
        "Persister stopped"
    );
    stats
}
