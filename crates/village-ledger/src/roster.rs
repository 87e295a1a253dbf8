//! The worker roster: hired worker counts per kind.
//!
//! Hiring is unconditional here. Capacity and food cost are enforced by
//! the session's hire workflow before [`WorkerRoster::hire`] is called.

use serde::{Deserialize, Serialize};

use village_types::WorkerKind;

/// Per-kind hired worker counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRoster {
    lumberjack: u64,
    miner: u64,
    hunter: u64,
}

impl WorkerRoster {
    /// An empty roster.
    pub const fn new() -> Self {
        Self {
            lumberjack: 0,
            miner: 0,
            hunter: 0,
        }
    }

    /// Workers of `kind` hired so far.
    pub const fn count(&self, kind: WorkerKind) -> u64 {
        match kind {
            WorkerKind::Lumberjack => self.lumberjack,
            WorkerKind::Miner => self.miner,
            WorkerKind::Hunter => self.hunter,
        }
    }

    /// Total workers across all kinds.
    pub const fn total(&self) -> u64 {
        self.lumberjack
            .saturating_add(self.miner)
            .saturating_add(self.hunter)
    }

    /// Add one worker of `kind`. Returns the new count.
    pub const fn hire(&mut self, kind: WorkerKind) -> u64 {
        let slot = match kind {
            WorkerKind::Lumberjack => &mut self.lumberjack,
            WorkerKind::Miner => &mut self.miner,
            WorkerKind::Hunter => &mut self.hunter,
        };
        *slot = slot.saturating_add(1);
        *slot
    }

    /// `(kind, count)` for every kind with at least one worker.
    pub fn active(&self) -> impl Iterator<Item = (WorkerKind, u64)> + '_ {
        WorkerKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
    }

    /// Zero every count.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hire_increments_one_kind() {
        let mut roster = WorkerRoster::new();
        assert_eq!(roster.hire(WorkerKind::Miner), 1);
        assert_eq!(roster.hire(WorkerKind::Miner), 2);
        assert_eq!(roster.count(WorkerKind::Miner), 2);
        assert_eq!(roster.count(WorkerKind::Hunter), 0);
        assert_eq!(roster.total(), 2);
    }

    #[test]
    fn active_skips_empty_kinds() {
        let mut roster = WorkerRoster::new();
        roster.hire(WorkerKind::Hunter);
        let active: Vec<_> = roster.active().collect();
        assert_eq!(active, vec![(WorkerKind::Hunter, 1)]);
    }

    #[test]
    fn reset_zeroes_all() {
        let mut roster = WorkerRoster::new();
        roster.hire(WorkerKind::Lumberjack);
        roster.reset();
        assert_eq!(roster.total(), 0);
    }
}
