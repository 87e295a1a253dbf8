//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. A real session task runs behind the handle, so
//! the responses reflect actual game rules.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use village_core::config::GameConfig;
use village_core::runner::{
    NoOpCallback, RunnerTiming, SessionControl, SystemClock, run_session, session_channel,
};
use village_core::session::Session;
use village_observer::router::build_router;
use village_observer::state::AppState;
use village_types::NotificationId;

/// App state backed by a freshly started session task.
fn make_test_state() -> Arc<AppState> {
    let config = GameConfig::default();
    let session = Session::new(&config, Utc::now()).unwrap();
    let (handle, rx) = session_channel(16);
    let timing = RunnerTiming::from_config(&config);
    tokio::spawn(async move {
        let control = SessionControl::new();
        let mut callback = NoOpCallback;
        run_session(session, rx, &control, &SystemClock, timing, &mut callback).await
    });
    Arc::new(AppState::new(handle))
}

/// App state whose session task is already gone.
fn make_closed_state() -> Arc<AppState> {
    let (handle, rx) = session_channel(1);
    drop(rx);
    Arc::new(AppState::new(handle))
}

async fn call(state: &Arc<AppState>, method: Method, uri: &str) -> (StatusCode, Value) {
    let app = build_router(Arc::clone(state));
    let resp = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_048_576)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

// =============================================================================
// GET /api/state
// =============================================================================

#[tokio::test]
async fn get_state_returns_fresh_game() {
    let state = make_test_state();
    let (status, json) = call(&state, Method::GET, "/api/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["resources"]["wood"], 0);
    assert_eq!(json["village"]["level"], 1);
    assert_eq!(json["village"]["maxWorkers"], 3);
    assert_eq!(json["totalWorkers"], 0);
    assert_eq!(json["activeGoals"].as_array().unwrap().len(), 3);
    assert_eq!(json["phase"]["phase"], "day");
}

#[tokio::test]
async fn get_state_without_session_or_cache_is_unavailable() {
    let state = make_closed_state();
    let (status, json) = call(&state, Method::GET, "/api/state").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn get_state_falls_back_to_last_published() {
    let live = make_test_state();
    let snapshot = live.session.snapshot().await.unwrap();

    let state = make_closed_state();
    *state.snapshot.write().await = Some(snapshot);
    let (status, json) = call(&state, Method::GET, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["village"]["level"], 1);
}

// =============================================================================
// POST /api/gather/{resource}
// =============================================================================

#[tokio::test]
async fn gather_applies_then_cools_down() {
    let state = make_test_state();

    let (status, json) = call(&state, Method::POST, "/api/gather/wood").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");

    let (status, json) = call(&state, Method::POST, "/api/gather/wood").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");

    let (_, json) = call(&state, Method::GET, "/api/state").await;
    assert_eq!(json["resources"]["wood"], 1);
}

#[tokio::test]
async fn gather_unknown_resource_is_bad_request() {
    let state = make_test_state();
    let (status, json) = call(&state, Method::POST, "/api/gather/diamonds").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "unknown resource: diamonds");
}

// =============================================================================
// POST /api/workers/{worker}/hire
// =============================================================================

#[tokio::test]
async fn hire_without_food_is_conflict() {
    let state = make_test_state();
    let (status, json) = call(&state, Method::POST, "/api/workers/hunter/hire").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["outcome"], "rejected");
    assert_eq!(json["reason"]["code"], "insufficientFood");
    assert_eq!(json["reason"]["required"], 10);
    assert_eq!(json["reason"]["available"], 0);

    let (_, json) = call(&state, Method::GET, "/api/state").await;
    assert_eq!(json["totalWorkers"], 0);
    assert_eq!(json["notifications"][0]["kind"], "error");
}

#[tokio::test]
async fn hire_unknown_worker_is_bad_request() {
    let state = make_test_state();
    let (status, _) = call(&state, Method::POST, "/api/workers/wizard/hire").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// POST /api/village/upgrade, POST /api/reset
// =============================================================================

#[tokio::test]
async fn upgrade_without_resources_is_conflict() {
    let state = make_test_state();
    let (status, json) = call(&state, Method::POST, "/api/village/upgrade").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["reason"]["code"], "insufficientResources");
    assert_eq!(json["reason"]["missing"]["wood"], 100);
    assert_eq!(json["reason"]["missing"]["stone"], 100);
}

#[tokio::test]
async fn reset_clears_progress() {
    let state = make_test_state();
    call(&state, Method::POST, "/api/gather/stone").await;

    let (status, json) = call(&state, Method::POST, "/api/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");

    let (_, json) = call(&state, Method::GET, "/api/state").await;
    assert_eq!(json["resources"]["stone"], 0);
    assert_eq!(json["notifications"].as_array().unwrap().len(), 1);
}

// =============================================================================
// DELETE /api/notifications/{id}
// =============================================================================

#[tokio::test]
async fn dismiss_existing_notification() {
    let state = make_test_state();
    call(&state, Method::POST, "/api/village/upgrade").await;

    let (_, json) = call(&state, Method::GET, "/api/state").await;
    let id = json["notifications"][0]["id"].as_str().unwrap().to_owned();

    let (status, json) = call(&state, Method::DELETE, &format!("/api/notifications/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");

    let (_, json) = call(&state, Method::GET, "/api/state").await;
    assert!(json["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dismiss_unknown_notification_is_ignored() {
    let state = make_test_state();
    let uri = format!("/api/notifications/{}", NotificationId::new());
    let (status, json) = call(&state, Method::DELETE, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
}

#[tokio::test]
async fn dismiss_malformed_id_is_bad_request() {
    let state = make_test_state();
    let (status, _) = call(&state, Method::DELETE, "/api/notifications/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn commands_after_session_stop_are_unavailable() {
    let state = make_closed_state();
    let (status, _) = call(&state, Method::POST, "/api/gather/food").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
