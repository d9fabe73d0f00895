//! Liveness probe handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

use crate::server::AppState;

/// Handles `GET /health`.
///
/// Minimal liveness check: reports that the process is serving requests
/// and which storage backend is active. Deliberately does not touch the
/// storage medium, so load balancers can poll it cheaply.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now(),
        "service": "hooklog",
        "storage": state.store.backend_name(),
    });

    (StatusCode::OK, Json(response))
}
