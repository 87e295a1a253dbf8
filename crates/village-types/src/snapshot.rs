//! Read-only projections handed to presentational collaborators.
//!
//! A [`GameSnapshot`] is everything a UI fragment needs to draw the game.
//! It is derived on demand from the session and is never authoritative:
//! collaborators read it and dispatch commands, they never write it back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Phase, ResourceKind, WorkerKind};
use crate::structs::{Goal, Notification, UpgradeCost};

/// Full read-only view of the game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameSnapshot {
    /// Current resource counters.
    pub resources: BTreeMap<ResourceKind, u64>,
    /// Per-kind roster entries in display order.
    pub workers: Vec<WorkerView>,
    /// Sum of all hired workers.
    pub total_workers: u64,
    /// Village level and capacity.
    pub village: VillageView,
    /// Goals not yet completed, in priority order.
    pub active_goals: Vec<GoalView>,
    /// Completed goals, in completion-ledger order.
    pub completed_goals: Vec<GoalView>,
    /// Pending notifications, oldest first.
    pub notifications: Vec<Notification>,
    /// Day/night phase information.
    pub phase: PhaseView,
}

impl GameSnapshot {
    /// Current amount of a resource.
    pub fn resource(&self, kind: ResourceKind) -> u64 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    /// Current count of a worker kind.
    pub fn workers_of(&self, kind: WorkerKind) -> u64 {
        self.workers
            .iter()
            .find(|view| view.kind == kind)
            .map_or(0, |view| view.count)
    }
}

/// One roster line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WorkerView {
    /// Worker kind.
    pub kind: WorkerKind,
    /// Workers of this kind hired so far.
    pub count: u64,
    /// Food cost of hiring the next one.
    pub hire_cost: u64,
    /// Resource this worker produces.
    pub produces: ResourceKind,
}

/// Village level, capacity and the price of the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct VillageView {
    /// Current level (starts at 1).
    pub level: u32,
    /// Worker capacity at this level.
    pub max_workers: u64,
    /// Resources needed to reach the next level.
    pub next_upgrade_cost: UpgradeCost,
}

/// A goal plus its progress toward the requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GoalView {
    /// The goal record.
    pub goal: Goal,
    /// Progress toward the requirement.
    pub progress: GoalProgress,
}

/// `current` out of `target`; `current` may exceed `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GoalProgress {
    /// Current resource amount or village level.
    pub current: u64,
    /// Requirement threshold.
    pub target: u64,
}

impl GoalProgress {
    /// Progress as a whole percentage, capped at 100.
    pub fn percent(&self) -> u64 {
        if self.target == 0 {
            return 100;
        }
        self.current
            .saturating_mul(100)
            .checked_div(self.target)
            .unwrap_or(100)
            .min(100)
    }
}

/// Day/night phase as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PhaseView {
    /// Current phase.
    pub phase: Phase,
    /// Seconds until the next flip (display only).
    pub seconds_remaining: u64,
    /// Start of the current phase.
    pub phase_started_at: DateTime<Utc>,
    /// First session start.
    pub game_started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_caps_at_hundred() {
        let p = GoalProgress {
            current: 50,
            target: 20,
        };
        assert_eq!(p.percent(), 100);
        let p = GoalProgress {
            current: 5,
            target: 20,
        };
        assert_eq!(p.percent(), 25);
    }

    #[test]
    fn zero_target_counts_as_done() {
        let p = GoalProgress {
            current: 0,
            target: 0,
        };
        assert_eq!(p.percent(), 100);
    }
}
