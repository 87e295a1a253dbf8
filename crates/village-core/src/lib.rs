//! Progression and goal-resolution engine for the Idle Village game.
//!
//! This crate owns the game rules: the story chain, the goal ledger and
//! its resolution algorithm, the day/night clock, passive production, and
//! the [`Session`] aggregate that ties them to the ledgers in
//! `village-ledger`. The [`runner`] module puts a session on a tokio task
//! and exposes it through a cloneable [`SessionHandle`].
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `village-config.yaml` into
//!   strongly-typed structs.
//! - [`story`] -- The fixed story goal catalog.
//! - [`goals`] -- [`GoalLedger`] and the resolution tick.
//! - [`clock`] -- [`DayNightClock`] with parity-based catch-up.
//! - [`production`] -- One tick of passive worker output.
//! - [`notifications`] -- Bounded notification queue.
//! - [`session`] -- [`Session`]: ledgers, action interface, signal queue.
//! - [`runner`] -- Session task, handle, control and callbacks.
//!
//! [`Session`]: session::Session
//! [`SessionHandle`]: runner::SessionHandle
//! [`GoalLedger`]: goals::GoalLedger
//! [`DayNightClock`]: clock::DayNightClock

pub mod clock;
pub mod config;
pub mod goals;
pub mod notifications;
pub mod production;
pub mod runner;
pub mod session;
pub mod story;
