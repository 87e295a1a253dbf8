//! Shared type definitions for the Idle Village progression engine.
//!
//! This crate is the single source of truth for all types exchanged
//! between the core, the persistence layer and presentational
//! collaborators. Types flow downstream to `TypeScript` via `ts-rs` so a
//! web UI can render snapshots and dispatch commands with matching shapes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for goals and notifications
//! - [`enums`] -- Resource, worker, phase, goal and notification kinds
//! - [`structs`] -- Goals, requirements, rewards, notifications, clock snapshot
//! - [`actions`] -- Command request/outcome types for the action interface
//! - [`snapshot`] -- Read-only projections of the game state

pub mod actions;
pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Command, CommandOutcome, RejectionReason};
pub use enums::{GoalKind, NotificationKind, Phase, ResourceKind, UnknownVariant, WorkerKind};
pub use ids::{GoalId, NotificationId};
pub use snapshot::{GameSnapshot, GoalProgress, GoalView, PhaseView, VillageView, WorkerView};
pub use structs::{ClockSnapshot, Goal, Notification, Requirement, Reward, UpgradeCost};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::GoalId::export_all();
        let _ = crate::ids::NotificationId::export_all();

        // Enums
        let _ = crate::enums::ResourceKind::export_all();
        let _ = crate::enums::WorkerKind::export_all();
        let _ = crate::enums::Phase::export_all();
        let _ = crate::enums::GoalKind::export_all();
        let _ = crate::enums::NotificationKind::export_all();

        // Structs
        let _ = crate::structs::Requirement::export_all();
        let _ = crate::structs::Reward::export_all();
        let _ = crate::structs::UpgradeCost::export_all();
        let _ = crate::structs::Goal::export_all();
        let _ = crate::structs::Notification::export_all();
        let _ = crate::structs::ClockSnapshot::export_all();

        // Actions
        let _ = crate::actions::Command::export_all();
        let _ = crate::actions::RejectionReason::export_all();
        let _ = crate::actions::CommandOutcome::export_all();

        // Snapshot
        let _ = crate::snapshot::GameSnapshot::export_all();
        let _ = crate::snapshot::WorkerView::export_all();
        let _ = crate::snapshot::VillageView::export_all();
        let _ = crate::snapshot::GoalView::export_all();
        let _ = crate::snapshot::GoalProgress::export_all();
        let _ = crate::snapshot::PhaseView::export_all();
    }
}
