//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin front-end access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /ws/state` -- `WebSocket` snapshot stream
/// - `GET /api/state` -- current game snapshot
/// - `POST /api/gather/{resource}` -- manual gather
/// - `POST /api/workers/{worker}/hire` -- hire a worker
/// - `POST /api/village/upgrade` -- upgrade the village
/// - `POST /api/reset` -- reset all progress
/// - `DELETE /api/notifications/{id}` -- dismiss a notification
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/state", get(ws::ws_state))
        // Read-only projection
        .route("/api/state", get(handlers::get_state))
        // Actions
        .route("/api/gather/{resource}", post(handlers::gather))
        .route("/api/workers/{worker}/hire", post(handlers::hire_worker))
        .route("/api/village/upgrade", post(handlers::upgrade_village))
        .route("/api/reset", post(handlers::reset))
        .route(
            "/api/notifications/{id}",
            delete(handlers::dismiss_notification),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
