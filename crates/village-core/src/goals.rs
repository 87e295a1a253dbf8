//! The goal ledger and the resolution algorithm.
//!
//! Goals move **active -> completed** exactly once. A resolution tick
//! completes at most one goal: the first active goal in ledger order whose
//! requirement holds. Completing it pays its reward into the resource
//! ledger and appends a successor:
//!
//! | Completed goal | Successor |
//! |----------------|-----------|
//! | story | next catalog entry, unless its key is already in the ledger |
//! | repeatable, resource | same resource, amount x multiplier, gold reward |
//! | repeatable, village level | level + 1, fixed gold reward |
//!
//! Ledger order is priority order. Because each tick re-scans from the
//! start, several goals satisfied at once are completed over consecutive
//! ticks, lowest index first.

use village_ledger::{BalanceTable, ResourceLedger, VillageRecord};
use village_types::{Goal, GoalId, GoalKind, GoalProgress, Requirement, ResourceKind, Reward};

use crate::session::SessionError;
use crate::story::{first_story_goal, next_story_goal};

/// Outcome of a resolution tick that completed a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The goal as it was completed.
    pub goal: Goal,
    /// The successor that was appended, if any.
    pub successor: Option<Goal>,
}

/// Ordered list of goals plus the idempotence marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalLedger {
    goals: Vec<Goal>,
    last_processed: Option<GoalId>,
}

impl GoalLedger {
    /// The initial seed: wood goal, village goal, first story entry.
    pub fn seeded(balance: &BalanceTable) -> Self {
        let mut ledger = Self {
            goals: Vec::with_capacity(3),
            last_processed: None,
        };
        for goal in seed_goals(balance) {
            ledger.add_goal(goal);
        }
        ledger
    }

    /// Rebuild from persisted goals.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSave`] when two goals share an id,
    /// or when a story goal lacks a story key or a repeatable goal has one.
    pub fn from_goals(goals: Vec<Goal>) -> Result<Self, SessionError> {
        let mut seen = std::collections::HashSet::with_capacity(goals.len());
        if !goals.iter().all(|goal| seen.insert(goal.id)) {
            return Err(SessionError::InvalidSave("duplicate goal id"));
        }
        if !goals.iter().all(kind_matches_story_key) {
            return Err(SessionError::InvalidSave("goal kind does not match story key"));
        }
        Ok(Self {
            goals,
            last_processed: None,
        })
    }

    /// Every goal in ledger order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Goals not yet completed, in priority order.
    pub fn active(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|goal| !goal.completed)
    }

    /// Completed goals, in ledger order.
    pub fn completed(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|goal| goal.completed)
    }

    /// Id of the goal completed by the most recent tick.
    pub const fn last_processed(&self) -> Option<GoalId> {
        self.last_processed
    }

    /// Append `goal` unless it duplicates an existing one.
    ///
    /// A goal with a story key is refused when any goal (active or
    /// completed) already has that key. A goal without one is refused when
    /// an existing non-story goal has a structurally equal requirement.
    /// The id is replaced if it collides. Returns whether it was added.
    pub fn add_goal(&mut self, mut goal: Goal) -> bool {
        let duplicate = match goal.story_key.as_deref() {
            Some(key) => self
                .goals
                .iter()
                .any(|existing| existing.story_key.as_deref() == Some(key)),
            None => self.goals.iter().any(|existing| {
                existing.story_key.is_none() && existing.requirement == goal.requirement
            }),
        };
        if duplicate {
            tracing::debug!(
                description = %goal.description,
                story_key = ?goal.story_key,
                "refusing duplicate goal"
            );
            return false;
        }
        while self.goals.iter().any(|existing| existing.id == goal.id) {
            goal.id = GoalId::new();
        }
        self.goals.push(goal);
        true
    }

    /// Run one resolution tick.
    ///
    /// Completes the first satisfied active goal, credits its reward to
    /// `resources` and appends its successor. Returns `None` when nothing
    /// is satisfied or the selected goal was already processed.
    pub fn resolve_tick(
        &mut self,
        resources: &mut ResourceLedger,
        village: &VillageRecord,
        balance: &BalanceTable,
    ) -> Option<Completion> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| !goal.completed && is_satisfied(&goal.requirement, resources, village))?;

        if self.last_processed == Some(goal.id) {
            return None;
        }

        goal.completed = true;
        self.last_processed = Some(goal.id);
        let completed = goal.clone();

        for (kind, amount) in completed.reward.iter() {
            resources.credit(kind, amount);
        }

        // add_goal may re-roll the id, so report the stored copy.
        let successor = successor_for(&completed, balance)
            .filter(|next| self.add_goal(next.clone()))
            .and_then(|_| self.goals.last().cloned());

        tracing::info!(
            goal = %completed.description,
            kind = ?completed.kind,
            successor = successor.as_ref().map_or("none", |g| g.description.as_str()),
            "goal completed"
        );

        Some(Completion {
            goal: completed,
            successor,
        })
    }

    /// Discard every goal and reseed with fresh ids.
    pub fn reset(&mut self, balance: &BalanceTable) {
        *self = Self::seeded(balance);
    }
}

/// Whether `requirement` holds for the given ledgers.
pub fn is_satisfied(
    requirement: &Requirement,
    resources: &ResourceLedger,
    village: &VillageRecord,
) -> bool {
    match *requirement {
        Requirement::Resource { kind, amount } => resources.get(kind) >= amount,
        Requirement::VillageLevel { level } => village.level() >= level,
    }
}

/// Current value against the requirement's target.
pub fn progress(
    requirement: &Requirement,
    resources: &ResourceLedger,
    village: &VillageRecord,
) -> GoalProgress {
    let current = match *requirement {
        Requirement::Resource { kind, .. } => resources.get(kind),
        Requirement::VillageLevel { .. } => u64::from(village.level()),
    };
    GoalProgress {
        current,
        target: requirement.target(),
    }
}

fn successor_for(completed: &Goal, balance: &BalanceTable) -> Option<Goal> {
    match completed.kind {
        GoalKind::Story => completed
            .story_key
            .as_deref()
            .and_then(next_story_goal)
            .map(|entry| entry.to_goal()),
        GoalKind::Repeatable => Some(match completed.requirement {
            Requirement::Resource { kind, amount } => {
                let next = balance.next_resource_goal_amount(amount);
                resource_goal(
                    kind,
                    next,
                    Reward::new().with(ResourceKind::Gold, balance.resource_goal_reward_gold(amount)),
                )
            }
            Requirement::VillageLevel { level } => village_goal(
                level.saturating_add(1),
                Reward::new().with(ResourceKind::Gold, balance.village_goal_reward_gold),
            ),
        }),
    }
}

fn resource_goal(kind: ResourceKind, amount: u64, reward: Reward) -> Goal {
    Goal {
        id: GoalId::new(),
        description: format!("Gather {amount} {kind}"),
        kind: GoalKind::Repeatable,
        story_key: None,
        requirement: Requirement::resource(kind, amount),
        reward,
        completed: false,
    }
}

fn village_goal(level: u32, reward: Reward) -> Goal {
    Goal {
        id: GoalId::new(),
        description: format!("Reach village level {level}"),
        kind: GoalKind::Repeatable,
        story_key: None,
        requirement: Requirement::village_level(level),
        reward,
        completed: false,
    }
}

fn seed_goals(balance: &BalanceTable) -> Vec<Goal> {
    let mut seeds = vec![
        resource_goal(
            ResourceKind::Wood,
            balance.initial_wood_goal,
            Reward::new().with(ResourceKind::Gold, balance.initial_wood_goal_reward_gold),
        ),
        village_goal(
            balance.initial_village_goal_level,
            Reward::new()
                .with(ResourceKind::Gold, balance.initial_village_goal_reward_gold)
                .with(ResourceKind::Food, balance.initial_village_goal_reward_food),
        ),
    ];
    seeds.extend(first_story_goal().map(|entry| entry.to_goal()));
    seeds
}

const fn kind_matches_story_key(goal: &Goal) -> bool {
    matches!(
        (goal.kind, &goal.story_key),
        (GoalKind::Story, Some(_)) | (GoalKind::Repeatable, None)
    )
}
