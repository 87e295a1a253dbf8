//! REST API endpoint handlers for the Observer server.
//!
//! Reads go to the session for a live snapshot and fall back to the last
//! published one if the session has stopped. Commands are forwarded
//! through the [`SessionHandle`](village_core::runner::SessionHandle) and
//! answered with the [`CommandOutcome`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/state` | Current game snapshot |
//! | `POST` | `/api/gather/{resource}` | Gather one batch manually |
//! | `POST` | `/api/workers/{worker}/hire` | Hire one worker |
//! | `POST` | `/api/village/upgrade` | Upgrade the village |
//! | `POST` | `/api/reset` | Wipe all progress |
//! | `DELETE` | `/api/notifications/{id}` | Dismiss a notification |
//!
//! # Status codes
//!
//! Applied and ignored commands answer `200`. Rejected commands answer
//! `409` with the rejection reason. Unknown resource or worker names and
//! malformed ids answer `400`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use village_types::{CommandOutcome, GameSnapshot, NotificationId, ResourceKind, WorkerKind};

use crate::error::ObserverError;
use crate::state::AppState;

/// Map a command outcome to its HTTP response.
fn outcome_response(outcome: CommandOutcome) -> Response {
    let status = if outcome.is_rejected() {
        StatusCode::CONFLICT
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Return the current game snapshot.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GameSnapshot>, ObserverError> {
    match state.session.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            tracing::debug!(error = %e, "session unavailable, serving last published state");
            state.latest().await.map(Json).ok_or(ObserverError::NotReady)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Gather one batch of the named resource.
pub async fn gather(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
) -> Result<Response, ObserverError> {
    let resource: ResourceKind = resource.parse()?;
    let outcome = state.session.gather(resource).await?;
    Ok(outcome_response(outcome))
}

/// Hire one worker of the named kind.
pub async fn hire_worker(
    State(state): State<Arc<AppState>>,
    Path(worker): Path<String>,
) -> Result<Response, ObserverError> {
    let worker: WorkerKind = worker.parse()?;
    let outcome = state.session.hire_worker(worker).await?;
    Ok(outcome_response(outcome))
}

/// Raise the village one level.
pub async fn upgrade_village(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ObserverError> {
    let outcome = state.session.upgrade_village().await?;
    Ok(outcome_response(outcome))
}

/// Wipe all progress. The day/night clock keeps running.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Response, ObserverError> {
    tracing::info!("Reset requested via observer API");
    let outcome = state.session.reset_all().await?;
    Ok(outcome_response(outcome))
}

/// Dismiss a notification by id. Unknown ids answer `ignored`.
pub async fn dismiss_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ObserverError> {
    let id: NotificationId = id
        .parse()
        .map_err(|e| ObserverError::InvalidUuid(format!("{id}: {e}")))?;
    let outcome = state.session.dismiss_notification(id).await?;
    Ok(outcome_response(outcome))
}
