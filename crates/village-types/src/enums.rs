//! Enumeration types for the Idle Village progression engine.
//!
//! Resource and worker kinds are closed sets. Every worker kind maps to
//! exactly one produced resource kind; the mapping lives here so the
//! production loop and the presentation layer agree on it.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// The enum being parsed (e.g. "resource").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// One of the four resource counters held by the resource ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Lumber, produced by lumberjacks.
    Wood,
    /// Quarried stone, produced by miners.
    Stone,
    /// Food, produced by hunters. Spent to hire workers.
    Food,
    /// Gold. Only gathered by hand or granted by goals.
    Gold,
}

impl ResourceKind {
    /// Every resource kind, in ledger display order.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Stone, Self::Food, Self::Gold];

    /// Lowercase wire name of the resource.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Food => "food",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "resource",
                value: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

/// A hireable worker type. Each produces one resource kind passively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum WorkerKind {
    /// Produces wood.
    Lumberjack,
    /// Produces stone.
    Miner,
    /// Produces food.
    Hunter,
}

impl WorkerKind {
    /// Every worker kind, in roster display order.
    pub const ALL: [Self; 3] = [Self::Lumberjack, Self::Miner, Self::Hunter];

    /// The resource this worker kind produces each production tick.
    pub const fn produces(self) -> ResourceKind {
        match self {
            Self::Lumberjack => ResourceKind::Wood,
            Self::Miner => ResourceKind::Stone,
            Self::Hunter => ResourceKind::Food,
        }
    }

    /// Lowercase wire name of the worker kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lumberjack => "lumberjack",
            Self::Miner => "miner",
            Self::Hunter => "hunter",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "worker",
                value: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Day / night
// ---------------------------------------------------------------------------

/// The current half of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Food gathering bonus is active.
    Day,
    /// Gold gathering bonus is active.
    Night,
}

impl Phase {
    /// Map the persisted `is_night` flag to a phase.
    pub const fn from_is_night(is_night: bool) -> Self {
        if is_night { Self::Night } else { Self::Day }
    }

    /// Whether this is the night phase.
    pub const fn is_night(self) -> bool {
        matches!(self, Self::Night)
    }
}

// ---------------------------------------------------------------------------
// Goals and notifications
// ---------------------------------------------------------------------------

/// Where a goal came from, which decides how its successor is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GoalKind {
    /// Auto-scaling template; completing one appends a harder copy.
    Repeatable,
    /// Hand-authored entry from the story chain.
    Story,
}

/// Severity class of a player-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NotificationKind {
    /// An action went through (hire, upgrade).
    Success,
    /// An action was rejected.
    Error,
    /// Neutral information (phase change, reset).
    Info,
    /// A goal was completed.
    Achievement,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn workers_map_one_to_one_onto_resources() {
        assert_eq!(WorkerKind::Lumberjack.produces(), ResourceKind::Wood);
        assert_eq!(WorkerKind::Miner.produces(), ResourceKind::Stone);
        assert_eq!(WorkerKind::Hunter.produces(), ResourceKind::Food);
    }

    #[test]
    fn resource_parses_case_insensitively() {
        assert_eq!("Gold".parse::<ResourceKind>(), Ok(ResourceKind::Gold));
        assert!("iron".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn worker_parse_error_names_input() {
        let err = "wizard".parse::<WorkerKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown worker: wizard");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ResourceKind::Stone).unwrap();
        assert_eq!(json, "\"stone\"");
        let phase: Phase = serde_json::from_str("\"night\"").unwrap();
        assert!(phase.is_night());
    }
}
