// inferd/crates/inferd/src/api/health_api.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// Readiness probe, distinct from the business endpoints. Ready iff at
/// least one model artifact is loaded in the active snapshot.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.snapshot();
    let ready = !registry.is_empty();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ok" } else { "unavailable" },
            "ready": ready,
            "models_loaded": registry.len(),
        })),
    )
}
