//! Passive production: one tick of worker output.
//!
//! Each worker kind with at least one hire yields
//! `count x gather_amount(produced, is_night)` of its resource. All kinds
//! are credited before the caller runs goal resolution, so resolution never
//! sees a half-applied tick.

use village_ledger::{BalanceTable, ResourceLedger, WorkerRoster};
use village_types::{ResourceKind, WorkerKind};

/// What one production tick yielded, per worker kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionReport {
    /// `(worker, resource, amount)` for every kind that produced.
    pub yields: Vec<(WorkerKind, ResourceKind, u64)>,
}

impl ProductionReport {
    /// Whether the tick produced anything.
    pub fn is_empty(&self) -> bool {
        self.yields.is_empty()
    }

    /// Total units produced across all kinds.
    pub fn total(&self) -> u64 {
        self.yields
            .iter()
            .fold(0_u64, |acc, (_, _, amount)| acc.saturating_add(*amount))
    }
}

/// Compute one tick of output without applying it.
pub fn production_yields(
    roster: &WorkerRoster,
    is_night: bool,
    balance: &BalanceTable,
) -> ProductionReport {
    let yields = roster
        .active()
        .map(|(worker, count)| {
            let resource = worker.produces();
            let amount = count.saturating_mul(balance.gather_amount(resource, is_night));
            (worker, resource, amount)
        })
        .collect();
    ProductionReport { yields }
}

/// Compute and credit one tick of output.
pub fn apply_production(
    resources: &mut ResourceLedger,
    roster: &WorkerRoster,
    is_night: bool,
    balance: &BalanceTable,
) -> ProductionReport {
    let report = production_yields(roster, is_night, balance);
    for &(_, resource, amount) in &report.yields {
        resources.credit(resource, amount);
    }
    report
}
