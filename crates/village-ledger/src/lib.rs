//! Balance table and state ledgers for the Idle Village engine.
//!
//! Every resource unit, hired worker and village level is held by one of
//! the three ledgers in this crate. The ledgers are dumb counters: policy
//! (capacity checks, affordability, cooldowns) lives with the caller in
//! `village-core`. What the ledgers do guarantee is their own invariants.
//!
//! # Architecture
//!
//! - [`balance`] -- The [`BalanceTable`]: pure cost and yield functions.
//! - [`resources`] -- The [`ResourceLedger`]: four counters with a zero floor.
//! - [`roster`] -- The [`WorkerRoster`]: per-kind hired worker counts.
//! - [`village`] -- The [`VillageRecord`]: level and derived capacity.
//!
//! # Invariants
//!
//! | Ledger | Invariant |
//! |--------|-----------|
//! | Resource | no counter is ever negative |
//! | Roster | counts only grow, except on reset |
//! | Village | `max_workers == village_max_workers(level)` |
//!
//! The ledgers never panic; all arithmetic saturates.
//!
//! # Usage
//!
//! ```
//! use village_ledger::{BalanceTable, ResourceLedger, VillageRecord};
//! use village_types::ResourceKind;
//!
//! let balance = BalanceTable::default();
//! let mut resources = ResourceLedger::new();
//! resources.apply_delta(ResourceKind::Wood, 150);
//! resources.apply_delta(ResourceKind::Wood, -500);
//! assert_eq!(resources.get(ResourceKind::Wood), 0);
//!
//! let mut village = VillageRecord::new(&balance);
//! village.upgrade(&balance);
//! assert_eq!(village.level(), 2);
//! assert_eq!(village.max_workers(), 5);
//! ```

pub mod balance;
pub mod resources;
pub mod roster;
pub mod village;

// Re-export primary types at crate root.
pub use balance::BalanceTable;
pub use resources::ResourceLedger;
pub use roster::WorkerRoster;
pub use village::VillageRecord;

use std::collections::BTreeMap;

use village_types::ResourceKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when spending from the ledgers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// One or more resources are short of the requested amounts.
    #[error("insufficient resources: {}", format_missing(missing))]
    Insufficient {
        /// Shortfall per resource (only short resources listed).
        missing: BTreeMap<ResourceKind, u64>,
    },

    /// A restored record failed validation.
    #[error("invalid ledger state: {0}")]
    InvalidState(&'static str),
}

fn format_missing(missing: &BTreeMap<ResourceKind, u64>) -> String {
    missing
        .iter()
        .map(|(kind, amount)| format!("{amount} {kind}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_error_lists_shortfalls() {
        let mut missing = BTreeMap::new();
        missing.insert(ResourceKind::Wood, 40);
        missing.insert(ResourceKind::Gold, 5);
        let err = LedgerError::Insufficient { missing };
        assert_eq!(err.to_string(), "insufficient resources: 40 wood, 5 gold");
    }
}
