//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Rejected commands are not errors; they are answered by the handlers
//! with `409 Conflict` and the outcome body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use village_core::session::SessionError;
use village_types::UnknownVariant;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A path segment did not name a known resource or worker.
    #[error("{0}")]
    UnknownName(#[from] UnknownVariant),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The session task is not running.
    #[error("session unavailable: {0}")]
    Session(#[from] SessionError),

    /// No state has been published yet.
    #[error("state not yet available")]
    NotReady,
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownName(_) | Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
