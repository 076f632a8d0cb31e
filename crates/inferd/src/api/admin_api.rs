// inferd/crates/inferd/src/api/admin_api.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Rebuild the registry from the models directory and swap it in
/// atomically. In-flight requests keep the snapshot they started with; on
/// failure the current snapshot stays active.
pub async fn reload_models(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = state.registry.clone();
    let result = tokio::task::spawn_blocking(move || registry.reload()).await;

    match result {
        Ok(Ok(count)) => {
            metrics::set_models_loaded(count);
            metrics::inc_request("admin_reload", "ok");
            info!("Registry reload completed: {} model(s) active", count);
            Ok(Json(json!({ "reloaded": count })))
        }
        Ok(Err(e)) => {
            metrics::inc_request("admin_reload", "error");
            error!("Registry reload failed: {:#}", e);
            Err(ApiError::load(
                "Reload failed, the current models remain active",
            ))
        }
        Err(join_err) => {
            metrics::inc_request("admin_reload", "error");
            error!("Registry reload task failed to run: {}", join_err);
            Err(ApiError::load(
                "Reload failed, the current models remain active",
            ))
        }
    }
}
