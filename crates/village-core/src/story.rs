//! The story goal catalog: a fixed, singly-linked chain of hand-authored
//! goals.
//!
//! Entries are looked up by key through a lazily built index. The catalog
//! is never mutated at runtime; the goal ledger copies an entry into a
//! fresh [`Goal`] when its predecessor completes.

use std::collections::HashMap;
use std::sync::LazyLock;

use village_types::{Goal, GoalId, GoalKind, Requirement, ResourceKind, Reward};

use ResourceKind::{Food, Gold, Stone, Wood};

/// One hand-authored entry in the story chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryEntry {
    /// Unique key (`story-NN`).
    pub key: &'static str,
    /// Player-facing text.
    pub description: &'static str,
    /// Completion condition.
    pub requirement: Requirement,
    /// Reward fields, zero amounts omitted.
    pub reward: &'static [(ResourceKind, u64)],
    /// Successor key; `None` ends the chain.
    pub next_key: Option<&'static str>,
}

impl StoryEntry {
    /// Build a fresh, uncompleted story goal from this entry.
    pub fn to_goal(&self) -> Goal {
        Goal {
            id: GoalId::new(),
            description: self.description.to_owned(),
            kind: GoalKind::Story,
            story_key: Some(self.key.to_owned()),
            requirement: self.requirement,
            reward: Reward::from_pairs(self.reward),
            completed: false,
        }
    }
}

const fn res(kind: ResourceKind, amount: u64) -> Requirement {
    Requirement::resource(kind, amount)
}

const fn lvl(level: u32) -> Requirement {
    Requirement::village_level(level)
}

/// The full chain, head first.
pub static STORY_CATALOG: &[StoryEntry] = &[
    StoryEntry {
        key: "story-01",
        description: "The elder asks you to clear the trail: gather 30 wood",
        requirement: res(Wood, 30),
        reward: &[(Gold, 12), (Food, 8)],
        next_key: Some("story-02"),
    },
    StoryEntry {
        key: "story-02",
        description: "The mason is laying a foundation: gather 25 stone",
        requirement: res(Stone, 25),
        reward: &[(Gold, 12), (Wood, 10)],
        next_key: Some("story-03"),
    },
    StoryEntry {
        key: "story-03",
        description: "The hunters came back with a map of the grounds: gather 35 food",
        requirement: res(Food, 35),
        reward: &[(Gold, 15)],
        next_key: Some("story-04"),
    },
    StoryEntry {
        key: "story-04",
        description: "Raise the village to level 2 and open the storehouse",
        requirement: lvl(2),
        reward: &[(Wood, 20), (Stone, 20), (Gold, 20)],
        next_key: Some("story-05"),
    },
    StoryEntry {
        key: "story-05",
        description: "Merchants are waiting for goods: stockpile 40 wood",
        requirement: res(Wood, 40),
        reward: &[(Gold, 18), (Food, 12)],
        next_key: Some("story-06"),
    },
    StoryEntry {
        key: "story-06",
        description: "The forge needs stone: stockpile 45 stone",
        requirement: res(Stone, 45),
        reward: &[(Gold, 20)],
        next_key: Some("story-07"),
    },
    StoryEntry {
        key: "story-07",
        description: "Feed the workers before the expedition: stockpile 55 food",
        requirement: res(Food, 55),
        reward: &[(Gold, 22), (Wood, 15)],
        next_key: Some("story-08"),
    },
    StoryEntry {
        key: "story-08",
        description: "A night caravan asks for coin: stockpile 25 gold",
        requirement: res(Gold, 25),
        reward: &[(Food, 25), (Stone, 15)],
        next_key: Some("story-09"),
    },
    StoryEntry {
        key: "story-09",
        description: "Raise the village to level 3 and reinforce the wall",
        requirement: lvl(3),
        reward: &[(Gold, 30), (Wood, 20), (Stone, 20)],
        next_key: Some("story-10"),
    },
    StoryEntry {
        key: "story-10",
        description: "The forester opens the far woods: stockpile 90 wood",
        requirement: res(Wood, 90),
        reward: &[(Gold, 28), (Food, 20)],
        next_key: Some("story-11"),
    },
    StoryEntry {
        key: "story-11",
        description: "The miners found a new vein: stockpile 95 stone",
        requirement: res(Stone, 95),
        reward: &[(Gold, 30)],
        next_key: Some("story-12"),
    },
    StoryEntry {
        key: "story-12",
        description: "Fill the granaries for the fair: stockpile 110 food",
        requirement: res(Food, 110),
        reward: &[(Gold, 32), (Wood, 25)],
        next_key: Some("story-13"),
    },
    StoryEntry {
        key: "story-13",
        description: "Pay the pass guards: stockpile 55 gold",
        requirement: res(Gold, 55),
        reward: &[(Stone, 35), (Food, 25)],
        next_key: Some("story-14"),
    },
    StoryEntry {
        key: "story-14",
        description: "Raise the village to level 4 and build the tower",
        requirement: lvl(4),
        reward: &[(Gold, 45), (Wood, 30), (Stone, 30)],
        next_key: Some("story-15"),
    },
    StoryEntry {
        key: "story-15",
        description: "Lay in supplies for winter: stockpile 180 food",
        requirement: res(Food, 180),
        reward: &[(Gold, 45), (Wood, 40)],
        next_key: Some("story-16"),
    },
    StoryEntry {
        key: "story-16",
        description: "End of the chapter: stockpile 120 gold and call the council",
        requirement: res(Gold, 120),
        reward: &[(Gold, 80), (Wood, 50), (Stone, 50), (Food, 50)],
        next_key: None,
    },
];

static INDEX: LazyLock<HashMap<&'static str, &'static StoryEntry>> =
    LazyLock::new(|| STORY_CATALOG.iter().map(|entry| (entry.key, entry)).collect());

/// Look up an entry by key.
pub fn story_entry(key: &str) -> Option<&'static StoryEntry> {
    INDEX.get(key).copied()
}

/// Head of the chain.
pub fn first_story_goal() -> Option<&'static StoryEntry> {
    STORY_CATALOG.first()
}

/// The entry named by `key`'s successor link, or `None` at the end of the
/// chain (or for an unknown key).
pub fn next_story_goal(key: &str) -> Option<&'static StoryEntry> {
    story_entry(key)
        .and_then(|entry| entry.next_key)
        .and_then(story_entry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn chain_starts_at_story_one() {
        let head = first_story_goal().unwrap();
        assert_eq!(head.key, "story-01");
        assert_eq!(head.requirement, Requirement::resource(Wood, 30));
    }

    #[test]
    fn successor_follows_next_key() {
        let next = next_story_goal("story-01").unwrap();
        assert_eq!(next.key, "story-02");
        let next = next_story_goal("story-08").unwrap();
        assert_eq!(next.requirement, Requirement::village_level(3));
    }

    #[test]
    fn chain_is_terminal_at_sixteen() {
        assert!(next_story_goal("story-16").is_none());
        assert!(next_story_goal("story-99").is_none());
    }

    #[test]
    fn walking_the_chain_visits_every_entry_once() {
        let mut seen = HashSet::new();
        let mut current = first_story_goal();
        while let Some(entry) = current {
            assert!(seen.insert(entry.key), "cycle at {}", entry.key);
            current = next_story_goal(entry.key);
        }
        assert_eq!(seen.len(), STORY_CATALOG.len());
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn to_goal_copies_reward_and_key() {
        let goal = story_entry("story-16").unwrap().to_goal();
        assert_eq!(goal.kind, GoalKind::Story);
        assert_eq!(goal.story_key.as_deref(), Some("story-16"));
        assert_eq!(goal.reward.amount(Gold), 80);
        assert_eq!(goal.reward.amount(Food), 50);
        assert!(!goal.completed);
    }
}
