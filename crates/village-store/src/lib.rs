//! Save storage for the idle village.
//!
//! Two documents are persisted: the day/night clock snapshot and the whole
//! saved game. Both are JSON. Storage is best-effort: the session runs
//! entirely in memory, writes are handed off to a background task, and
//! anything that cannot be read back at startup is treated as absent.
//!
//! # Architecture
//!
//! ```text
//! Session task
//!     |
//!     +-- PersistCallback --try_send--> run_persister --> StateStore
//!                                                          |-- File      (JSON per key)
//!                                                          |-- Memory    (tests)
//!                                                          +-- Dragonfly (DragonflyPool)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- Backend-agnostic [`StateStore`] and the persisted keys
//! - [`file`] -- JSON file backend with atomic replace
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`persist`] -- Fire-and-forget persister task and session callback
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod file;
pub mod persist;
pub mod store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyPool;
pub use error::StoreError;
pub use file::FileStore;
pub use persist::{PersistCallback, PersistJob, PersisterStats, run_persister, spawn_persister};
pub use store::{CLOCK_KEY, STATE_KEY, StateStore};
