//! The resource ledger: four non-negative counters.
//!
//! Every mutation goes through one saturating shift of a single counter;
//! [`ResourceLedger::apply_delta`] is its signed form, while
//! [`ResourceLedger::credit`] and [`ResourceLedger::spend`] are unsigned.
//! Spending checks affordability first, and the shift clamps at zero
//! regardless, so no sequence of mutations can drive a counter negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use village_types::ResourceKind;

use crate::LedgerError;

/// Counters for wood, stone, food and gold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    wood: u64,
    stone: u64,
    food: u64,
    gold: u64,
}

impl ResourceLedger {
    /// A ledger with every counter at zero.
    pub const fn new() -> Self {
        Self {
            wood: 0,
            stone: 0,
            food: 0,
            gold: 0,
        }
    }

    /// Current amount of `kind`.
    pub const fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Food => self.food,
            ResourceKind::Gold => self.gold,
        }
    }

    const fn slot(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Gold => &mut self.gold,
        }
    }

    const fn shift(&mut self, kind: ResourceKind, amount: u64, raise: bool) -> u64 {
        let slot = self.slot(kind);
        *slot = if raise {
            slot.saturating_add(amount)
        } else {
            slot.saturating_sub(amount)
        };
        *slot
    }

    /// Set `counter[kind] = max(0, counter[kind] + delta)`.
    ///
    /// Returns the new value.
    pub const fn apply_delta(&mut self, kind: ResourceKind, delta: i64) -> u64 {
        self.shift(kind, delta.unsigned_abs(), delta >= 0)
    }

    /// Add a non-negative amount. Saturates at `u64::MAX`.
    pub const fn credit(&mut self, kind: ResourceKind, amount: u64) -> u64 {
        self.shift(kind, amount, true)
    }

    /// Shortfall per resource for the given costs. Empty when affordable.
    pub fn shortfall(&self, costs: &[(ResourceKind, u64)]) -> BTreeMap<ResourceKind, u64> {
        costs
            .iter()
            .filter_map(|&(kind, amount)| {
                let have = self.get(kind);
                (have < amount).then(|| (kind, amount.saturating_sub(have)))
            })
            .collect()
    }

    /// Whether every cost can be paid from current counters.
    pub fn can_afford(&self, costs: &[(ResourceKind, u64)]) -> bool {
        costs.iter().all(|&(kind, amount)| self.get(kind) >= amount)
    }

    /// Deduct every cost, or nothing at all.
    ///
    /// On error, no counter has changed and the error lists the shortfall.
    pub fn spend(&mut self, costs: &[(ResourceKind, u64)]) -> Result<(), LedgerError> {
        if !self.can_afford(costs) {
            return Err(LedgerError::Insufficient {
                missing: self.shortfall(costs),
            });
        }
        for &(kind, amount) in costs {
            self.shift(kind, amount, false);
        }
        Ok(())
    }

    /// Counters as a map, in resource order.
    pub fn to_map(&self) -> BTreeMap<ResourceKind, u64> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .collect()
    }

    /// Restore all four counters to zero.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn negative_delta_clamps_at_zero() {
        let mut ledger = ResourceLedger::new();
        ledger.apply_delta(ResourceKind::Stone, 5);
        assert_eq!(ledger.apply_delta(ResourceKind::Stone, -9), 0);
        assert_eq!(ledger.apply_delta(ResourceKind::Stone, i64::MIN), 0);
    }

    #[test]
    fn mixed_deltas_track_expected_totals() {
        let mut ledger = ResourceLedger::new();
        for delta in [3_i64, -7, 12, -1, -100, 50] {
            ledger.apply_delta(ResourceKind::Wood, delta);
        }
        // 3 -> 0 -> 12 -> 11 -> 0 -> 50
        assert_eq!(ledger.get(ResourceKind::Wood), 50);
        assert_eq!(ledger.get(ResourceKind::Food), 0);
    }

    #[test]
    fn positive_delta_saturates() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Gold, u64::MAX);
        assert_eq!(ledger.apply_delta(ResourceKind::Gold, 10), u64::MAX);
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Wood, 100);
        ledger.credit(ResourceKind::Stone, 40);
        let costs = [(ResourceKind::Wood, 100), (ResourceKind::Stone, 100)];
        let expected = BTreeMap::from([(ResourceKind::Stone, 60)]);
        assert_eq!(
            ledger.spend(&costs),
            Err(LedgerError::Insufficient { missing: expected })
        );
        assert_eq!(ledger.get(ResourceKind::Wood), 100);
        assert_eq!(ledger.get(ResourceKind::Stone), 40);
    }

    #[test]
    fn spend_deducts_exactly() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Food, 25);
        assert!(ledger.can_afford(&[(ResourceKind::Food, 25)]));
        assert!(ledger.spend(&[(ResourceKind::Food, 10)]).is_ok());
        assert_eq!(ledger.get(ResourceKind::Food), 15);
    }

    #[test]
    fn credit_and_spend_agree_with_signed_deltas() {
        let mut unsigned = ResourceLedger::new();
        let mut signed = ResourceLedger::new();
        unsigned.credit(ResourceKind::Gold, 30);
        signed.apply_delta(ResourceKind::Gold, 30);
        unsigned.spend(&[(ResourceKind::Gold, 12)]).unwrap();
        signed.apply_delta(ResourceKind::Gold, -12);
        assert_eq!(unsigned, signed);
        assert_eq!(unsigned.get(ResourceKind::Gold), 18);
        assert!(!unsigned.can_afford(&[(ResourceKind::Gold, 19)]));
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut ledger = ResourceLedger::new();
        for kind in ResourceKind::ALL {
            ledger.credit(kind, 9);
        }
        ledger.reset();
        assert!(ledger.to_map().values().all(|v| *v == 0));
    }
}
