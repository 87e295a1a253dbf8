//! The session aggregate: every ledger plus the action interface.
//!
//! A [`Session`] owns the resource ledger, worker roster, village record,
//! goal ledger, day/night clock and notification queue. Presentational
//! collaborators never touch these directly; they dispatch a [`Command`]
//! and read a [`GameSnapshot`].
//!
//! # Goal resolution
//!
//! Every mutation of the resource ledger or village record enqueues a
//! resolve signal. The queue is drained before the mutating call returns,
//! one resolution tick per signal. A completed goal's reward is itself a
//! ledger mutation, so it enqueues the next signal. The drain stops after
//! `max_resolution_ticks` signals.
//!
//! | Operation | Mutates | Notification |
//! |-----------|---------|--------------|
//! | gather | resources | none |
//! | hire worker | resources, roster | success / error |
//! | upgrade village | resources, village | success / error |
//! | reset all | everything but the clock | info |
//! | production tick | resources | none |
//! | clock tick | clock | info on flip |
//! | goal completion | resources, goals | achievement |

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use village_ledger::{BalanceTable, LedgerError, ResourceLedger, VillageRecord, WorkerRoster};
use village_types::{
    ClockSnapshot, Command, CommandOutcome, GameSnapshot, Goal, GoalView, Notification,
    NotificationId, NotificationKind, PhaseView, RejectionReason, ResourceKind, VillageView,
    WorkerKind, WorkerView,
};

use crate::clock::{ClockError, DayNightClock, PhaseFlip, phase_message};
use crate::config::{ClockConfig, GameConfig, SessionConfig};
use crate::goals::{GoalLedger, progress};
use crate::notifications::NotificationQueue;
use crate::production::{ProductionReport, apply_production};

/// Errors that can occur while building or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Clock configuration was rejected.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A persisted ledger failed validation.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Persisted state is structurally valid JSON but semantically broken.
    #[error("invalid saved game: {0}")]
    InvalidSave(&'static str),

    /// The session task has stopped and no longer accepts requests.
    #[error("session is closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// Whole-state snapshot persisted under the state key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    /// Resource counters.
    pub resources: ResourceLedger,
    /// Hired worker counts.
    pub workers: WorkerRoster,
    /// Village level and capacity.
    pub village: VillageRecord,
    /// Goal ledger in order.
    pub goals: Vec<Goal>,
    /// Notification queue, oldest first.
    pub notifications: Vec<Notification>,
}

/// Internal signal processed synchronously after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    ResolveGoals,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The owned game state and the operations on it.
#[derive(Debug, Clone)]
pub struct Session {
    balance: BalanceTable,
    settings: SessionConfig,
    resources: ResourceLedger,
    roster: WorkerRoster,
    village: VillageRecord,
    goals: GoalLedger,
    clock: DayNightClock,
    notifications: NotificationQueue,
    last_gather: BTreeMap<ResourceKind, DateTime<Utc>>,
    signals: VecDeque<Signal>,
}

impl Session {
    /// A fresh game starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Clock`] if the phase duration is invalid.
    pub fn new(config: &GameConfig, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let clock = DayNightClock::new(now, config.clock.phase_duration())?;
        Ok(Self::assemble(config, clock))
    }

    fn assemble(config: &GameConfig, clock: DayNightClock) -> Self {
        let balance = config.balance.clone();
        Self {
            resources: ResourceLedger::new(),
            roster: WorkerRoster::new(),
            village: VillageRecord::new(&balance),
            goals: GoalLedger::seeded(&balance),
            clock,
            notifications: NotificationQueue::new(config.session.notification_limit),
            last_gather: BTreeMap::new(),
            signals: VecDeque::new(),
            settings: config.session.clone(),
            balance,
        }
    }

    /// Rehydrate from whatever persisted state survived loading.
    ///
    /// A missing or invalid save starts a fresh game; a missing clock
    /// starts a fresh day at `now`. Either way the clock is caught up to
    /// `now` before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Clock`] if the phase duration is invalid.
    pub fn restore(
        config: &GameConfig,
        saved: Option<SavedGame>,
        clock: Option<ClockSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let clock = restore_clock(&config.clock, clock, now)?;
        let mut session = Self::assemble(config, clock);

        if let Some(saved) = saved {
            match session.load_saved(saved) {
                Ok(()) => tracing::info!(
                    level = session.village.level(),
                    goals = session.goals.goals().len(),
                    "restored saved game"
                ),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding invalid saved game");
                    session = Self::assemble(config, clock);
                }
            }
        }

        session.clock_tick(now);
        Ok(session)
    }

    fn load_saved(&mut self, saved: SavedGame) -> Result<(), SessionError> {
        self.village = saved.village.revalidate(&self.balance)?;
        self.goals = GoalLedger::from_goals(saved.goals)?;
        self.resources = saved.resources;
        self.roster = saved.workers;
        self.notifications =
            NotificationQueue::restore(saved.notifications, self.settings.notification_limit);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Balance table in effect.
    pub const fn balance(&self) -> &BalanceTable {
        &self.balance
    }

    /// Resource counters.
    pub const fn resources(&self) -> &ResourceLedger {
        &self.resources
    }

    /// Worker roster.
    pub const fn roster(&self) -> &WorkerRoster {
        &self.roster
    }

    /// Village record.
    pub const fn village(&self) -> &VillageRecord {
        &self.village
    }

    /// Goal ledger.
    pub const fn goals(&self) -> &GoalLedger {
        &self.goals
    }

    /// Day/night clock.
    pub const fn clock(&self) -> &DayNightClock {
        &self.clock
    }

    /// Notification queue.
    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    // -----------------------------------------------------------------------
    // Action interface
    // -----------------------------------------------------------------------

    /// Dispatch a command.
    pub fn execute(&mut self, command: Command, now: DateTime<Utc>) -> CommandOutcome {
        match command {
            Command::Gather { resource } => self.gather(resource, now),
            Command::HireWorker { worker } => self.hire_worker(worker, now),
            Command::UpgradeVillage => self.upgrade_village(now),
            Command::ResetAll => self.reset_all(now),
            Command::DismissNotification { id } => self.dismiss_notification(id),
        }
    }

    /// Manually gather one batch of `kind`.
    ///
    /// Ignored if the previous gather of the same resource was less than
    /// the cooldown ago. A gather exactly one cooldown later succeeds.
    pub fn gather(&mut self, kind: ResourceKind, now: DateTime<Utc>) -> CommandOutcome {
        let cooldown = TimeDelta::from_std(self.settings.gather_cooldown()).unwrap_or(TimeDelta::MAX);
        if let Some(last) = self.last_gather.get(&kind)
            && now.signed_duration_since(*last) < cooldown
        {
            tracing::trace!(resource = %kind, "gather ignored during cooldown");
            return CommandOutcome::Ignored;
        }
        self.last_gather.insert(kind, now);

        let amount = self.balance.gather_amount(kind, self.clock.is_night());
        self.resources.credit(kind, amount);
        tracing::debug!(resource = %kind, amount, "gathered");
        self.signal(now);
        CommandOutcome::Applied
    }

    /// Hire one worker of `kind`, paying its food cost.
    pub fn hire_worker(&mut self, kind: WorkerKind, now: DateTime<Utc>) -> CommandOutcome {
        let total = self.roster.total();
        let capacity = self.village.max_workers();
        if total >= capacity {
            return self.reject(
                RejectionReason::CapacityExceeded { total, capacity },
                "Not enough room in the village: upgrade it to hire more workers",
                now,
            );
        }

        let required = self.balance.hire_cost(self.roster.count(kind));
        let available = self.resources.get(ResourceKind::Food);
        if self.pay(&[(ResourceKind::Food, required)]).is_err() {
            return self.reject(
                RejectionReason::InsufficientFood {
                    required,
                    available,
                },
                format!("Not enough food to hire a {kind}: need {required}"),
                now,
            );
        }
        let count = self.roster.hire(kind);
        tracing::info!(worker = %kind, count, cost = required, "worker hired");
        self.notifications.push(
            NotificationKind::Success,
            format!("Hired a {kind} for {required} food"),
            now,
        );
        self.signal(now);
        CommandOutcome::Applied
    }

    /// Raise the village one level, paying the upgrade cost.
    pub fn upgrade_village(&mut self, now: DateTime<Utc>) -> CommandOutcome {
        let cost = self.balance.village_upgrade_cost(self.village.level());
        if let Err(missing) = self.pay(&cost.pairs()) {
            let detail = missing
                .iter()
                .map(|(kind, amount)| format!("{amount} {kind}"))
                .collect::<Vec<_>>()
                .join(", ");
            return self.reject(
                RejectionReason::InsufficientResources { missing },
                format!("Not enough resources to upgrade the village: missing {detail}"),
                now,
            );
        }
        let level = self.village.upgrade(&self.balance);
        tracing::info!(
            level,
            max_workers = self.village.max_workers(),
            wood = cost.wood,
            stone = cost.stone,
            gold = cost.gold,
            "village upgraded"
        );
        self.notifications.push(
            NotificationKind::Success,
            format!("The village reached level {level}"),
            now,
        );
        self.signal(now);
        CommandOutcome::Applied
    }

    /// Wipe all progress and reseed the goal ledger. The clock keeps
    /// running.
    pub fn reset_all(&mut self, now: DateTime<Utc>) -> CommandOutcome {
        self.resources.reset();
        self.roster.reset();
        self.village.reset(&self.balance);
        self.goals.reset(&self.balance);
        self.notifications.clear();
        self.last_gather.clear();
        self.signals.clear();
        tracing::info!("game reset");
        self.notifications
            .push(NotificationKind::Info, "The village starts over", now);
        self.signal(now);
        CommandOutcome::Applied
    }

    /// Remove a notification. Unknown ids are ignored.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> CommandOutcome {
        if self.notifications.dismiss(id) {
            CommandOutcome::Applied
        } else {
            CommandOutcome::Ignored
        }
    }

    // -----------------------------------------------------------------------
    // Scheduled work
    // -----------------------------------------------------------------------

    /// One passive production tick, then goal resolution.
    pub fn production_tick(&mut self, now: DateTime<Utc>) -> ProductionReport {
        let report = apply_production(
            &mut self.resources,
            &self.roster,
            self.clock.is_night(),
            &self.balance,
        );
        if !report.is_empty() {
            self.signal(now);
        }
        report
    }

    /// Catch the day/night clock up to `now`, announcing a flip.
    pub fn clock_tick(&mut self, now: DateTime<Utc>) -> Option<PhaseFlip> {
        let flip = self.clock.recompute(now)?;
        tracing::info!(phase = ?flip.phase, transitions = flip.transitions, "phase changed");
        self.notifications.push(
            NotificationKind::Info,
            phase_message(flip.phase, &self.balance),
            now,
        );
        Some(flip)
    }

    // -----------------------------------------------------------------------
    // Signal queue
    // -----------------------------------------------------------------------

    fn signal(&mut self, now: DateTime<Utc>) {
        self.signals.push_back(Signal::ResolveGoals);
        self.drain_signals(now);
    }

    fn drain_signals(&mut self, now: DateTime<Utc>) {
        let mut ticks: u32 = 0;
        while let Some(signal) = self.signals.pop_front() {
            if ticks >= self.settings.max_resolution_ticks {
                tracing::warn!(ticks, "goal resolution cascade truncated");
                self.signals.clear();
                break;
            }
            ticks = ticks.saturating_add(1);
            match signal {
                Signal::ResolveGoals => {
                    let Some(done) =
                        self.goals
                            .resolve_tick(&mut self.resources, &self.village, &self.balance)
                    else {
                        continue;
                    };
                    self.notifications.push(
                        NotificationKind::Achievement,
                        format!("Goal complete: {}", done.goal.description),
                        now,
                    );
                    // The reward changed the ledger.
                    self.signals.push_back(Signal::ResolveGoals);
                }
            }
        }
    }

    fn pay(&mut self, costs: &[(ResourceKind, u64)]) -> Result<(), BTreeMap<ResourceKind, u64>> {
        self.resources.spend(costs).map_err(|e| match e {
            LedgerError::Insufficient { missing } => missing,
            LedgerError::InvalidState(_) => BTreeMap::new(),
        })
    }

    fn reject(
        &mut self,
        reason: RejectionReason,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> CommandOutcome {
        let message = message.into();
        tracing::debug!(reason = ?reason, %message, "command rejected");
        self.notifications.push(NotificationKind::Error, message, now);
        CommandOutcome::Rejected { reason }
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    /// Persisted clock fields.
    pub const fn clock_snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// Whole-state snapshot for persistence.
    pub fn saved_game(&self) -> SavedGame {
        SavedGame {
            resources: self.resources,
            workers: self.roster,
            village: self.village,
            goals: self.goals.goals().to_vec(),
            notifications: self.notifications.to_vec(),
        }
    }

    /// Read-only view for presentational collaborators.
    pub fn snapshot(&self, now: DateTime<Utc>) -> GameSnapshot {
        let view = |goal: &Goal| GoalView {
            goal: goal.clone(),
            progress: progress(&goal.requirement, &self.resources, &self.village),
        };
        let clock = self.clock.snapshot();
        GameSnapshot {
            resources: self.resources.to_map(),
            workers: WorkerKind::ALL
                .into_iter()
                .map(|kind| {
                    let count = self.roster.count(kind);
                    WorkerView {
                        kind,
                        count,
                        hire_cost: self.balance.hire_cost(count),
                        produces: kind.produces(),
                    }
                })
                .collect(),
            total_workers: self.roster.total(),
            village: VillageView {
                level: self.village.level(),
                max_workers: self.village.max_workers(),
                next_upgrade_cost: self.balance.village_upgrade_cost(self.village.level()),
            },
            active_goals: self.goals.active().map(view).collect(),
            completed_goals: self.goals.completed().map(view).collect(),
            notifications: self.notifications.to_vec(),
            phase: PhaseView {
                phase: self.clock.phase(),
                seconds_remaining: self.clock.seconds_remaining(now),
                phase_started_at: clock.phase_started_at,
                game_started_at: clock.game_started_at,
            },
        }
    }
}

fn restore_clock(
    config: &ClockConfig,
    snapshot: Option<ClockSnapshot>,
    now: DateTime<Utc>,
) -> Result<DayNightClock, ClockError> {
    match snapshot {
        Some(snapshot) => DayNightClock::from_snapshot(snapshot, config.phase_duration()),
        None => DayNightClock::new(now, config.phase_duration()),
    }
}
