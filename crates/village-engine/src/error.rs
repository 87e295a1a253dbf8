//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! that can stop the engine from starting. Once the session is running
//! nothing is fatal: storage problems degrade to in-memory play.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: village_core::config::ConfigError,
    },

    /// The session could not be built.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: village_core::session::SessionError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: village_observer::StartupError,
    },
}
