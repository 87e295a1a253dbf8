//! The village record: level plus capacity derived from it.

use serde::{Deserialize, Serialize};

use crate::{BalanceTable, LedgerError};

/// Village level and worker capacity.
///
/// `max_workers` is always `village_max_workers(level)` for the balance
/// table the record was last updated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillageRecord {
    level: u32,
    max_workers: u64,
}

impl VillageRecord {
    /// A level-1 village.
    pub fn new(balance: &BalanceTable) -> Self {
        Self {
            level: 1,
            max_workers: balance.village_max_workers(1),
        }
    }

    /// Current level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current worker capacity.
    pub const fn max_workers(&self) -> u64 {
        self.max_workers
    }

    /// Raise the level by one and recompute capacity. Returns the new level.
    pub fn upgrade(&mut self, balance: &BalanceTable) -> u32 {
        self.level = self.level.saturating_add(1);
        self.max_workers = balance.village_max_workers(self.level);
        self.level
    }

    /// Back to level 1 with base capacity.
    pub fn reset(&mut self, balance: &BalanceTable) {
        *self = Self::new(balance);
    }

    /// Check a restored record and recompute capacity from its level.
    pub fn revalidate(self, balance: &BalanceTable) -> Result<Self, LedgerError> {
        if self.level == 0 {
            return Err(LedgerError::InvalidState("village level must be at least 1"));
        }
        Ok(Self {
            level: self.level,
            max_workers: balance.village_max_workers(self.level),
        })
    }
}
