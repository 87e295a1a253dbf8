//! Error types for the persistence layer.
//!
//! Every backend reports failures through [`StoreError`]. The session never
//! sees these: loads degrade to "absent" and writes are logged and dropped.

use std::path::PathBuf;

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A filesystem operation on a save file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The store could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}
