//! Core entity structs for the Idle Village progression engine.
//!
//! These are the records that get persisted and handed to presentational
//! collaborators: goals with their requirements and rewards, queued
//! notifications, and the persisted day/night clock pair.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{GoalKind, NotificationKind, ResourceKind};
use crate::ids::{GoalId, NotificationId};

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// The condition a goal waits for. Exactly one threshold per goal.
///
/// Equality is structural (tag plus fields), which is what the goal
/// ledger's duplicate guard compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Requirement {
    /// Satisfied when the ledger holds at least `amount` of `kind`.
    Resource {
        /// Resource to count.
        kind: ResourceKind,
        /// Threshold, inclusive.
        amount: u64,
    },
    /// Satisfied when the village is at least `level`.
    VillageLevel {
        /// Threshold, inclusive.
        level: u32,
    },
}

impl Requirement {
    /// Shorthand for a resource threshold.
    pub const fn resource(kind: ResourceKind, amount: u64) -> Self {
        Self::Resource { kind, amount }
    }

    /// Shorthand for a village-level threshold.
    pub const fn village_level(level: u32) -> Self {
        Self::VillageLevel { level }
    }

    /// The numeric target, used for progress display.
    pub fn target(&self) -> u64 {
        match *self {
            Self::Resource { amount, .. } => amount,
            Self::VillageLevel { level } => u64::from(level),
        }
    }
}

// ---------------------------------------------------------------------------
// Rewards and costs
// ---------------------------------------------------------------------------

/// One-time resource grant paid out when a goal completes.
///
/// Zero amounts are never stored, so iterating a reward only yields the
/// fields that actually pay out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reward(BTreeMap<ResourceKind, u64>);

impl Reward {
    /// An empty reward.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add `amount` of `kind` to the reward. Zero is ignored.
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, amount: u64) -> Self {
        if amount > 0 {
            let entry = self.0.entry(kind).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
        self
    }

    /// Build a reward from `(kind, amount)` pairs.
    pub fn from_pairs(pairs: &[(ResourceKind, u64)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |reward, &(kind, amount)| reward.with(kind, amount))
    }

    /// Amount granted of a single resource (0 if absent).
    pub fn amount(&self, kind: ResourceKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Iterate the non-zero fields in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u64)> + '_ {
        self.0
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(kind, amount)| (*kind, *amount))
    }

    /// Whether the reward grants nothing.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Resources spent to raise the village by one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeCost {
    /// Wood required.
    pub wood: u64,
    /// Stone required.
    pub stone: u64,
    /// Gold required (zero for the first upgrade).
    pub gold: u64,
}

impl UpgradeCost {
    /// The cost as `(kind, amount)` pairs, zero amounts included.
    pub const fn pairs(&self) -> [(ResourceKind, u64); 3] {
        [
            (ResourceKind::Wood, self.wood),
            (ResourceKind::Stone, self.stone),
            (ResourceKind::Gold, self.gold),
        ]
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// A target condition with a one-time reward.
///
/// Goals move from active to completed exactly once and are never
/// removed, except when the whole ledger is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Goal {
    /// Unique within the goal ledger.
    pub id: GoalId,
    /// Player-facing text.
    pub description: String,
    /// Repeatable template or story-chain entry.
    pub kind: GoalKind,
    /// Story chain key; only set for [`GoalKind::Story`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub story_key: Option<String>,
    /// Completion condition.
    pub requirement: Requirement,
    /// Resources granted on completion.
    pub reward: Reward,
    /// Terminal flag; never reverts.
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A message for the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Notification {
    /// Unique within the queue; used to dismiss.
    pub id: NotificationId,
    /// Player-facing text.
    pub message: String,
    /// Severity class.
    pub kind: NotificationKind,
    /// When the notification was queued.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Day / night clock
// ---------------------------------------------------------------------------

/// Persisted state of the day/night clock.
///
/// Everything else about the phase (seconds remaining, bonus text) is
/// derived from these fields and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ClockSnapshot {
    /// Start of the current phase.
    pub phase_started_at: DateTime<Utc>,
    /// First session start; never advanced.
    pub game_started_at: DateTime<Utc>,
    /// Whether the current phase is night.
    pub is_night: bool,
}
