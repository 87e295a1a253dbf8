//! Session scheduler: one tokio task owns the [`Session`].
//!
//! This module provides [`run_session`], the async loop that drives a game
//! session with:
//!
//! - **Passive production**: a fixed-interval ticker crediting worker output
//! - **Day/night recomputation**: a second ticker catching the clock up
//! - **Commands**: requests from any number of [`SessionHandle`] clones
//! - **Clean shutdown**: [`SessionControl::request_stop`], or every handle
//!   dropped, ends the loop and drops both tickers
//!
//! All state mutation happens on the session task, so there is a single
//! logical mutator and no locking around the ledgers. After every tick that
//! changed something and every applied command, the runner hands a
//! [`SessionUpdate`] to the [`SessionCallback`], which is how persistence
//! and the observer learn about changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use village_types::{
    ClockSnapshot, Command, CommandOutcome, GameSnapshot, NotificationId, ResourceKind, WorkerKind,
};

use crate::config::GameConfig;
use crate::session::{SavedGame, Session, SessionError};

// ---------------------------------------------------------------------------
// Time source
// ---------------------------------------------------------------------------

/// Source of "now" for the session.
pub trait WallClock: Send + Sync {
    /// The current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// [`WallClock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Control plane
// ---------------------------------------------------------------------------

/// Shared stop flag for the session task.
#[derive(Debug, Default)]
pub struct SessionControl {
    stop_requested: AtomicBool,
    stop_notify: Notify,
}

impl SessionControl {
    /// A control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean stop and wake the session task.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }
}

/// A request to the session task.
#[derive(Debug)]
pub enum SessionRequest {
    /// Run a command and reply with its outcome.
    Execute {
        /// The command to run.
        command: Command,
        /// Where to send the outcome.
        reply: oneshot::Sender<CommandOutcome>,
    },
    /// Reply with the current read-only projection.
    Snapshot {
        /// Where to send the snapshot.
        reply: oneshot::Sender<GameSnapshot>,
    },
}

/// Cloneable client for a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    requests: mpsc::Sender<SessionRequest>,
}

impl SessionHandle {
    /// Dispatch `command` and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(SessionRequest::Execute { command, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Fetch the current read-only projection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session task has stopped.
    pub async fn snapshot(&self) -> Result<GameSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(SessionRequest::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Gather one batch of `resource`.
    pub async fn gather(&self, resource: ResourceKind) -> Result<CommandOutcome, SessionError> {
        self.execute(Command::Gather { resource }).await
    }

    /// Hire one worker of `worker`.
    pub async fn hire_worker(&self, worker: WorkerKind) -> Result<CommandOutcome, SessionError> {
        self.execute(Command::HireWorker { worker }).await
    }

    /// Raise the village one level.
    pub async fn upgrade_village(&self) -> Result<CommandOutcome, SessionError> {
        self.execute(Command::UpgradeVillage).await
    }

    /// Wipe all progress.
    pub async fn reset_all(&self) -> Result<CommandOutcome, SessionError> {
        self.execute(Command::ResetAll).await
    }

    /// Remove a notification.
    pub async fn dismiss_notification(
        &self,
        id: NotificationId,
    ) -> Result<CommandOutcome, SessionError> {
        self.execute(Command::DismissNotification { id }).await
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// What triggered a [`SessionUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCause {
    /// First update, before any tick.
    Started,
    /// Passive production credited something.
    Production,
    /// The day/night clock was recomputed.
    Clock,
    /// A command changed state.
    Command,
    /// Final update on shutdown.
    Stopped,
}

/// State handed to [`SessionCallback::on_update`].
#[derive(Debug)]
pub struct SessionUpdate<'a> {
    /// What triggered the update.
    pub cause: UpdateCause,
    /// Read-only projection for presentational collaborators.
    pub snapshot: &'a GameSnapshot,
    /// Persisted clock fields.
    pub clock: ClockSnapshot,
    /// Whole-state snapshot for persistence.
    pub saved: &'a SavedGame,
}

/// Callback invoked after the session state changes.
///
/// Implementations must not block; persistence and broadcast are expected
/// to hand the data off to other tasks.
pub trait SessionCallback: Send {
    /// Called with the state after a change.
    fn on_update(&mut self, update: &SessionUpdate<'_>);
}

/// A no-op callback for testing.
pub struct NoOpCallback;

impl SessionCallback for NoOpCallback {
    fn on_update(&mut self, _update: &SessionUpdate<'_>) {}
}

/// Fans one update out to several callbacks, in order.
#[derive(Default)]
pub struct CallbackChain {
    callbacks: Vec<Box<dyn SessionCallback>>,
}

impl CallbackChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback.
    #[must_use]
    pub fn with(mut self, callback: impl SessionCallback + 'static) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }
}

impl SessionCallback for CallbackChain {
    fn on_update(&mut self, update: &SessionUpdate<'_>) {
        for callback in &mut self.callbacks {
            callback.on_update(update);
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Why the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// [`SessionControl::request_stop`] was called.
    StopRequested,
    /// Every [`SessionHandle`] was dropped.
    HandlesDropped,
}

/// Result of a session run.
#[derive(Debug)]
pub struct SessionSummary {
    /// Why the loop ended.
    pub end_reason: SessionEndReason,
    /// Production ticks executed.
    pub production_ticks: u64,
    /// Clock recomputations executed.
    pub clock_ticks: u64,
    /// Commands that changed state.
    pub commands_applied: u64,
    /// Commands rejected by validation.
    pub commands_rejected: u64,
    /// Commands ignored (cooldown, unknown id).
    pub commands_ignored: u64,
    /// The session as it was when the loop ended.
    pub session: Session,
}

/// Ticker periods for [`run_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTiming {
    /// Passive production period.
    pub production_interval: Duration,
    /// Day/night recomputation period.
    pub clock_interval: Duration,
}

impl RunnerTiming {
    /// Periods taken from the game configuration.
    pub const fn from_config(config: &GameConfig) -> Self {
        Self {
            production_interval: config.session.production_interval(),
            clock_interval: config.clock.recompute_interval(),
        }
    }
}

/// Create the request channel for a session.
pub fn session_channel(buffer: usize) -> (SessionHandle, mpsc::Receiver<SessionRequest>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (SessionHandle { requests: tx }, rx)
}

/// Drive `session` until a stop is requested or every handle is dropped.
///
/// Both tickers fire immediately once and then every period; missed ticks
/// are skipped rather than bursted.
pub async fn run_session(
    mut session: Session,
    mut requests: mpsc::Receiver<SessionRequest>,
    control: &SessionControl,
    wall: &dyn WallClock,
    timing: RunnerTiming,
    callback: &mut dyn SessionCallback,
) -> SessionSummary {
    let mut production = tokio::time::interval(timing.production_interval);
    production.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = tokio::time::interval(timing.clock_interval);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut production_ticks: u64 = 0;
    let mut clock_ticks: u64 = 0;
    let mut commands_applied: u64 = 0;
    let mut commands_rejected: u64 = 0;
    let mut commands_ignored: u64 = 0;

    info!(
        production_ms = timing.production_interval.as_millis(),
        clock_ms = timing.clock_interval.as_millis(),
        level = session.village().level(),
        "Session starting"
    );
    publish(&session, wall.now(), UpdateCause::Started, callback);

    let end_reason = loop {
        tokio::select! {
            biased;

            () = control.stopped() => {
                info!("Session stop requested");
                break SessionEndReason::StopRequested;
            }

            request = requests.recv() => {
                let Some(request) = request else {
                    info!("All session handles dropped");
                    break SessionEndReason::HandlesDropped;
                };
                let now = wall.now();
                match request {
                    SessionRequest::Execute { command, reply } => {
                        let outcome = session.execute(command, now);
                        debug!(?command, ?outcome, "command executed");
                        match &outcome {
                            CommandOutcome::Applied => {
                                commands_applied = commands_applied.saturating_add(1);
                            }
                            CommandOutcome::Rejected { .. } => {
                                commands_rejected = commands_rejected.saturating_add(1);
                            }
                            CommandOutcome::Ignored => {
                                commands_ignored = commands_ignored.saturating_add(1);
                            }
                        }
                        // Rejections still queue an error notification.
                        if !matches!(outcome, CommandOutcome::Ignored) {
                            publish(&session, now, UpdateCause::Command, callback);
                        }
                        if reply.send(outcome).is_err() {
                            debug!("command caller went away before the reply");
                        }
                    }
                    SessionRequest::Snapshot { reply } => {
                        if reply.send(session.snapshot(now)).is_err() {
                            debug!("snapshot caller went away before the reply");
                        }
                    }
                }
            }

            _ = production.tick() => {
                production_ticks = production_ticks.saturating_add(1);
                let now = wall.now();
                let report = session.production_tick(now);
                if !report.is_empty() {
                    publish(&session, now, UpdateCause::Production, callback);
                }
            }

            _ = clock.tick() => {
                clock_ticks = clock_ticks.saturating_add(1);
                let now = wall.now();
                session.clock_tick(now);
                // The clock is persisted after every recomputation.
                publish(&session, now, UpdateCause::Clock, callback);
            }
        }
    };

    publish(&session, wall.now(), UpdateCause::Stopped, callback);
    if commands_rejected > 0 {
        warn!(commands_rejected, "session ended with rejected commands");
    }
    info!(
        reason = ?end_reason,
        production_ticks,
        clock_ticks,
        commands_applied,
        "Session ended"
    );

    SessionSummary {
        end_reason,
        production_ticks,
        clock_ticks,
        commands_applied,
        commands_rejected,
        commands_ignored,
        session,
    }
}

fn publish(
    session: &Session,
    now: DateTime<Utc>,
    cause: UpdateCause,
    callback: &mut dyn SessionCallback,
) {
    let snapshot = session.snapshot(now);
    let saved = session.saved_game();
    callback.on_update(&SessionUpdate {
        cause,
        snapshot: &snapshot,
        clock: session.clock_snapshot(),
        saved: &saved,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicU64;

    use super::*;

    #[tokio::test]
    async fn stop_before_start_ends_immediately() {
        let config = GameConfig::default();
        let session = Session::new(&config, Utc::now()).unwrap();
        let (_handle, rx) = session_channel(4);
        let control = SessionControl::new();
        control.request_stop();
        let mut cb = NoOpCallback;

        let summary = run_session(
            session,
            rx,
            &control,
            &SystemClock,
            RunnerTiming::from_config(&config),
            &mut cb,
        )
        .await;

        assert_eq!(summary.end_reason, SessionEndReason::StopRequested);
        assert_eq!(summary.commands_applied, 0);
    }

    #[tokio::test]
    async fn dropping_handles_ends_session() {
        let config = GameConfig::default();
        let session = Session::new(&config, Utc::now()).unwrap();
        let (handle, rx) = session_channel(4);
        drop(handle);
        let mut cb = NoOpCallback;

        let summary = run_session(
            session,
            rx,
            &SessionControl::new(),
            &SystemClock,
            RunnerTiming::from_config(&config),
            &mut cb,
        )
        .await;

        assert_eq!(summary.end_reason, SessionEndReason::HandlesDropped);
    }

    #[test]
    fn callback_chain_calls_every_callback() {
        struct Count(Arc<AtomicU64>);
        impl SessionCallback for Count {
            fn on_update(&mut self, _update: &SessionUpdate<'_>) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let hits = Arc::new(AtomicU64::new(0));
        let mut chain = CallbackChain::new()
            .with(Count(Arc::clone(&hits)))
            .with(Count(Arc::clone(&hits)));
        let config = GameConfig::default();
        let session = Session::new(&config, Utc::now()).unwrap();
        publish(&session, Utc::now(), UpdateCause::Started, &mut chain);
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }
}
