//! Command request and outcome types for the action interface.
//!
//! Presentational collaborators never touch ledger fields. They submit a
//! [`Command`] and get back a [`CommandOutcome`] describing whether the
//! command changed state, was silently ignored, or was rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ResourceKind, WorkerKind};
use crate::ids::NotificationId;

/// An intent dispatched to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Manually gather one batch of a resource.
    Gather {
        /// Resource to gather.
        resource: ResourceKind,
    },
    /// Hire one worker of the given kind.
    HireWorker {
        /// Worker kind to hire.
        worker: WorkerKind,
    },
    /// Raise the village by one level.
    UpgradeVillage,
    /// Wipe all progress and reseed the goal ledger.
    ResetAll,
    /// Remove a notification from the queue.
    DismissNotification {
        /// Notification to remove.
        id: NotificationId,
    },
}

/// Why a command was refused. No state changes accompany a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "code", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// The roster is already at the village's worker capacity.
    CapacityExceeded {
        /// Workers currently hired.
        total: u64,
        /// Current village capacity.
        capacity: u64,
    },
    /// Not enough food to pay the hire cost.
    InsufficientFood {
        /// Hire cost in food.
        required: u64,
        /// Food on hand.
        available: u64,
    },
    /// At least one upgrade resource is short.
    InsufficientResources {
        /// Shortfall per resource (only short resources listed).
        missing: BTreeMap<ResourceKind, u64>,
    },
}

/// Result of dispatching a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum CommandOutcome {
    /// The command changed state.
    Applied,
    /// The command was dropped without effect (gather cooldown, unknown
    /// notification id).
    Ignored,
    /// A validation failure; reported to the player.
    Rejected {
        /// What failed.
        reason: RejectionReason,
    },
}

impl CommandOutcome {
    /// Whether the command changed state.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Whether the command was rejected by validation.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn command_is_tagged_by_action() {
        let cmd: Command =
            serde_json::from_str(r#"{"action":"hireWorker","worker":"miner"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::HireWorker {
                worker: WorkerKind::Miner
            }
        );
        let cmd: Command = serde_json::from_str(r#"{"action":"upgradeVillage"}"#).unwrap();
        assert_eq!(cmd, Command::UpgradeVillage);
    }

    #[test]
    fn rejection_serializes_reason_code() {
        let outcome = CommandOutcome::Rejected {
            reason: RejectionReason::InsufficientFood {
                required: 10,
                available: 3,
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"]["code"], "insufficientFood");
        assert_eq!(json["reason"]["required"], 10);
        assert!(outcome.is_rejected());
        assert!(!outcome.is_applied());
    }
}
