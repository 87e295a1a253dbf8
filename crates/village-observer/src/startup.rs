//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the port eagerly, so a port conflict is
//! reported to the caller, then serves on a background Tokio task.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the Observer server and run it on a background Tokio task.
///
/// The server runs until `shutdown` resolves. The caller should await the
/// returned handle during clean shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_observer<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<JoinHandle<()>, StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(port = config.port, "Observer server spawned on background task");

    Ok(handle)
}
