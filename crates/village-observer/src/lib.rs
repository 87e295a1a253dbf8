//! Observer API server for the idle village.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/state`) streaming a full
//!   [`GameSnapshot`](village_types::GameSnapshot) after every change via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for the read-only projection and for every player
//!   action (gather, hire, upgrade, reset, dismiss notification)
//!
//! # Architecture
//!
//! The observer never owns game state. Actions and live reads go through a
//! [`SessionHandle`](village_core::runner::SessionHandle) to the session
//! task; the session task publishes snapshots back into [`AppState`] for
//! `WebSocket` clients and for reads after the session has stopped.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
