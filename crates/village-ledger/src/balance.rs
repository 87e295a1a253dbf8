//! The balance table: pure functions from a count or level to a cost or
//! yield.
//!
//! Tuning constants are configuration, not algorithm. A [`BalanceTable`]
//! deserializes from the `balance` section of the game config with every
//! field optional, falling back to the stock values below.
//!
//! All functions are total. Inputs are counts and levels, and every
//! operation saturates instead of overflowing.

use serde::{Deserialize, Serialize};

use village_types::{ResourceKind, UpgradeCost};

/// Tunable constants for costs, capacities, yields and goal scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceTable {
    /// Food cost of the first worker of any kind.
    #[serde(default = "default_hire_base_food_cost")]
    pub hire_base_food_cost: u64,
    /// Extra food per worker of the same kind already hired.
    #[serde(default = "default_hire_cost_step")]
    pub hire_cost_step: u64,
    /// Worker capacity at village level 1.
    #[serde(default = "default_village_base_worker_capacity")]
    pub village_base_worker_capacity: u64,
    /// Capacity gained per level above 1.
    #[serde(default = "default_village_worker_capacity_per_level")]
    pub village_worker_capacity_per_level: u64,
    /// Wood per current level to upgrade.
    #[serde(default = "default_village_upgrade_wood_per_level")]
    pub village_upgrade_wood_per_level: u64,
    /// Stone per current level to upgrade.
    #[serde(default = "default_village_upgrade_stone_per_level")]
    pub village_upgrade_stone_per_level: u64,
    /// Gold per level above 1 to upgrade.
    #[serde(default = "default_village_upgrade_gold_per_level")]
    pub village_upgrade_gold_per_level: u64,
    /// Yield of a gather or one worker-tick before phase bonuses.
    #[serde(default = "default_base_gather_amount")]
    pub base_gather_amount: u64,
    /// Extra food per gather during the day.
    #[serde(default = "default_day_food_bonus")]
    pub day_food_bonus: u64,
    /// Extra gold per gather at night.
    #[serde(default = "default_night_gold_bonus")]
    pub night_gold_bonus: u64,
    /// Factor applied to a completed resource goal's amount.
    #[serde(default = "default_resource_goal_multiplier")]
    pub resource_goal_multiplier: u64,
    /// Divisor turning a completed amount into the next gold reward.
    #[serde(default = "default_resource_goal_gold_reward_divisor")]
    pub resource_goal_gold_reward_divisor: u64,
    /// Gold granted by each successor village-level goal.
    #[serde(default = "default_village_goal_reward_gold")]
    pub village_goal_reward_gold: u64,
    /// Wood threshold of the first repeatable seed goal.
    #[serde(default = "default_initial_wood_goal")]
    pub initial_wood_goal: u64,
    /// Gold reward of the first repeatable seed goal.
    #[serde(default = "default_initial_wood_goal_reward_gold")]
    pub initial_wood_goal_reward_gold: u64,
    /// Level threshold of the village seed goal.
    #[serde(default = "default_initial_village_goal_level")]
    pub initial_village_goal_level: u32,
    /// Gold reward of the village seed goal.
    #[serde(default = "default_initial_village_goal_reward_gold")]
    pub initial_village_goal_reward_gold: u64,
    /// Food reward of the village seed goal.
    #[serde(default = "default_initial_village_goal_reward_food")]
    pub initial_village_goal_reward_food: u64,
}

impl Default for BalanceTable {
    fn default() -> Self {
        Self {
            hire_base_food_cost: default_hire_base_food_cost(),
            hire_cost_step: default_hire_cost_step(),
            village_base_worker_capacity: default_village_base_worker_capacity(),
            village_worker_capacity_per_level: default_village_worker_capacity_per_level(),
            village_upgrade_wood_per_level: default_village_upgrade_wood_per_level(),
            village_upgrade_stone_per_level: default_village_upgrade_stone_per_level(),
            village_upgrade_gold_per_level: default_village_upgrade_gold_per_level(),
            base_gather_amount: default_base_gather_amount(),
            day_food_bonus: default_day_food_bonus(),
            night_gold_bonus: default_night_gold_bonus(),
            resource_goal_multiplier: default_resource_goal_multiplier(),
            resource_goal_gold_reward_divisor: default_resource_goal_gold_reward_divisor(),
            village_goal_reward_gold: default_village_goal_reward_gold(),
            initial_wood_goal: default_initial_wood_goal(),
            initial_wood_goal_reward_gold: default_initial_wood_goal_reward_gold(),
            initial_village_goal_level: default_initial_village_goal_level(),
            initial_village_goal_reward_gold: default_initial_village_goal_reward_gold(),
            initial_village_goal_reward_food: default_initial_village_goal_reward_food(),
        }
    }
}

impl BalanceTable {
    /// Food cost to hire the `(count_of_kind + 1)`-th worker of a kind.
    pub const fn hire_cost(&self, count_of_kind: u64) -> u64 {
        self.hire_base_food_cost
            .saturating_add(count_of_kind.saturating_mul(self.hire_cost_step))
    }

    /// Worker capacity at `level`.
    pub fn village_max_workers(&self, level: u32) -> u64 {
        let extra_levels = u64::from(level.saturating_sub(1));
        self.village_base_worker_capacity
            .saturating_add(extra_levels.saturating_mul(self.village_worker_capacity_per_level))
    }

    /// Resources needed to go from `level` to `level + 1`.
    pub fn village_upgrade_cost(&self, level: u32) -> UpgradeCost {
        let level_u64 = u64::from(level);
        let gold = if level > 1 {
            self.village_upgrade_gold_per_level
                .saturating_mul(u64::from(level.saturating_sub(1)))
        } else {
            0
        };
        UpgradeCost {
            wood: self.village_upgrade_wood_per_level.saturating_mul(level_u64),
            stone: self.village_upgrade_stone_per_level.saturating_mul(level_u64),
            gold,
        }
    }

    /// Yield of one manual gather, or of one worker for one production tick.
    pub const fn gather_amount(&self, kind: ResourceKind, is_night: bool) -> u64 {
        let mut amount = self.base_gather_amount;
        if matches!(kind, ResourceKind::Food) && !is_night {
            amount = amount.saturating_add(self.day_food_bonus);
        }
        if matches!(kind, ResourceKind::Gold) && is_night {
            amount = amount.saturating_add(self.night_gold_bonus);
        }
        amount
    }

    /// Threshold of the repeatable goal that follows one for `current`.
    pub const fn next_resource_goal_amount(&self, current: u64) -> u64 {
        current.saturating_mul(self.resource_goal_multiplier)
    }

    /// Gold reward for the repeatable goal that follows one for `current`.
    /// Never less than 1.
    pub fn resource_goal_reward_gold(&self, current: u64) -> u64 {
        current
            .checked_div(self.resource_goal_gold_reward_divisor)
            .unwrap_or(0)
            .max(1)
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

const fn default_hire_base_food_cost() -> u64 {
    10
}
const fn default_hire_cost_step() -> u64 {
    2
}
const fn default_village_base_worker_capacity() -> u64 {
    3
}
const fn default_village_worker_capacity_per_level() -> u64 {
    2
}
const fn default_village_upgrade_wood_per_level() -> u64 {
    100
}
const fn default_village_upgrade_stone_per_level() -> u64 {
    100
}
const fn default_village_upgrade_gold_per_level() -> u64 {
    50
}
const fn default_base_gather_amount() -> u64 {
    1
}
const fn default_day_food_bonus() -> u64 {
    1
}
const fn default_night_gold_bonus() -> u64 {
    1
}
const fn default_resource_goal_multiplier() -> u64 {
    2
}
const fn default_resource_goal_gold_reward_divisor() -> u64 {
    10
}
const fn default_village_goal_reward_gold() -> u64 {
    50
}
const fn default_initial_wood_goal() -> u64 {
    20
}
const fn default_initial_wood_goal_reward_gold() -> u64 {
    5
}
const fn default_initial_village_goal_level() -> u32 {
    2
}
const fn default_initial_village_goal_reward_gold() -> u64 {
    10
}
const fn default_initial_village_goal_reward_food() -> u64 {
    10
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hire_cost_grows_linearly() {
        let b = BalanceTable::default();
        assert_eq!(b.hire_cost(0), 10);
        assert_eq!(b.hire_cost(1), 12);
        assert_eq!(b.hire_cost(5), 20);
    }

    #[test]
    fn capacity_by_level() {
        let b = BalanceTable::default();
        assert_eq!(b.village_max_workers(1), 3);
        assert_eq!(b.village_max_workers(2), 5);
        assert_eq!(b.village_max_workers(4), 9);
    }

    #[test]
    fn first_upgrade_costs_no_gold() {
        let b = BalanceTable::default();
        assert_eq!(
            b.village_upgrade_cost(1),
            UpgradeCost {
                wood: 100,
                stone: 100,
                gold: 0
            }
        );
        assert_eq!(
            b.village_upgrade_cost(3),
            UpgradeCost {
                wood: 300,
                stone: 300,
                gold: 100
            }
        );
    }

    #[test]
    fn gather_bonuses_follow_phase() {
        let b = BalanceTable::default();
        assert_eq!(b.gather_amount(ResourceKind::Food, false), 2);
        assert_eq!(b.gather_amount(ResourceKind::Food, true), 1);
        assert_eq!(b.gather_amount(ResourceKind::Gold, true), 2);
        assert_eq!(b.gather_amount(ResourceKind::Gold, false), 1);
        assert_eq!(b.gather_amount(ResourceKind::Wood, true), 1);
        assert_eq!(b.gather_amount(ResourceKind::Stone, false), 1);
    }

    #[test]
    fn resource_goal_scaling() {
        let b = BalanceTable::default();
        assert_eq!(b.next_resource_goal_amount(20), 40);
        assert_eq!(b.resource_goal_reward_gold(20), 2);
        assert_eq!(b.resource_goal_reward_gold(5), 1);
        assert_eq!(b.resource_goal_reward_gold(0), 1);
    }

    #[test]
    fn zero_divisor_still_rewards_one_gold() {
        let b = BalanceTable {
            resource_goal_gold_reward_divisor: 0,
            ..BalanceTable::default()
        };
        assert_eq!(b.resource_goal_reward_gold(500), 1);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let b: BalanceTable = serde_yml::from_str("hire_base_food_cost: 7\n").unwrap();
        assert_eq!(b.hire_base_food_cost, 7);
        assert_eq!(b.hire_cost_step, 2);
        assert_eq!(b.initial_village_goal_level, 2);
    }
}
