// inferd/crates/inferd/src/api/predict_api.rs
//
// Prediction endpoints. Requests are validated against the target model's
// input schema before the engine runs; inference itself executes on the
// blocking pool under the configured per-request timeout, so a slow model
// frees its worker instead of hanging the handler forever.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::{ApiError, Json};
use crate::inference::engine;
use crate::metrics;
use crate::state::AppState;

/// Body of `POST /predict`: a model identifier plus the model's input
/// fields, flattened alongside it.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(flatten)]
    pub inputs: Map<String, Value>,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let model_id = payload.model.clone().ok_or_else(|| {
        metrics::inc_request("predict", "invalid");
        ApiError::validation("Missing field: 'model'")
    })?;
    run_prediction(&state, &model_id, payload.inputs).await
}

/// Per-model variant; the path segment wins over any `model` key in the body.
pub async fn predict_for_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    Json(payload): Json<PredictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_prediction(&state, &model_id, payload.inputs).await
}

struct InflightGuard;

impl InflightGuard {
    fn acquire() -> Self {
        metrics::inc_inflight();
        Self
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        metrics::dec_inflight();
    }
}

async fn run_prediction(
    state: &AppState,
    model_id: &str,
    inputs: Map<String, Value>,
) -> Result<axum::Json<Value>, ApiError> {
    let _permit = match state.inflight.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            metrics::inc_request("predict", "overload");
            warn!("Rejecting prediction for '{}': no free permits", model_id);
            return Err(ApiError::overload());
        }
    };
    let _inflight = InflightGuard::acquire();

    let artifact = state.registry.get(model_id).ok_or_else(|| {
        metrics::inc_request("predict", "not_found");
        ApiError::not_found(model_id)
    })?;

    // Boundary validation: loose JSON becomes typed values here or the
    // request dies with a 400 before the engine ever runs.
    let values = artifact.input_schema.validate(&inputs).map_err(|msg| {
        metrics::inc_request("predict", "invalid");
        ApiError::validation(msg)
    })?;

    let started = Instant::now();
    let task_artifact = artifact.clone();
    let task = tokio::task::spawn_blocking(move || engine::infer(&task_artifact, &values));

    let output = match tokio::time::timeout(state.cfg.request_timeout(), task).await {
        Err(_) => {
            metrics::inc_request("predict", "timeout");
            warn!(
                "Prediction for '{}' exceeded {}s timeout",
                model_id, state.cfg.request_timeout_seconds
            );
            return Err(ApiError::timeout(state.cfg.request_timeout_seconds));
        }
        Ok(Err(join_err)) => {
            metrics::inc_request("predict", "error");
            warn!("Inference task for '{}' failed to run: {}", model_id, join_err);
            return Err(ApiError::inference(format!(
                "Prediction failed for model '{}'",
                model_id
            )));
        }
        Ok(Ok(Err(e))) => {
            metrics::inc_request("predict", "error");
            warn!("Inference failed for '{}': {:#}", model_id, e);
            return Err(ApiError::inference(format!(
                "Prediction failed for model '{}'",
                model_id
            )));
        }
        Ok(Ok(Ok(output))) => output,
    };

    metrics::observe_inference(started.elapsed().as_secs_f64());
    metrics::inc_request("predict", "ok");
    debug!(
        "Prediction for '{}' completed in {:?}",
        model_id,
        started.elapsed()
    );
    Ok(axum::Json(Value::Object(output)))
}
