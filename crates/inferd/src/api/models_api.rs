// inferd/crates/inferd/src/api/models_api.rs
//
// Introspection endpoints over the active registry snapshot. The describe
// response exposes schemas so clients can build requests without guessing;
// model weights stay server-side.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;
use crate::inference::schema::Schema;
use crate::metrics;
use crate::registry::ModelArtifact;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub version: String,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelDetail {
    pub name: String,
    pub version: String,
    pub kind: &'static str,
    pub input_schema: Schema,
    pub output_schema: Schema,
}

impl ModelSummary {
    fn from_artifact(artifact: &ModelArtifact) -> Self {
        Self {
            name: artifact.name.clone(),
            version: artifact.version.clone(),
            kind: artifact.model.kind_name(),
        }
    }
}

impl ModelDetail {
    fn from_artifact(artifact: &ModelArtifact) -> Self {
        Self {
            name: artifact.name.clone(),
            version: artifact.version.clone(),
            kind: artifact.model.kind_name(),
            input_schema: artifact.input_schema.clone(),
            output_schema: artifact.output_schema.clone(),
        }
    }
}

pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.snapshot();
    let models: Vec<ModelSummary> = registry
        .artifacts()
        .iter()
        .map(|a| ModelSummary::from_artifact(a))
        .collect();

    metrics::inc_request("models_list", "ok");
    Json(json!({
        "models": models,
        "total": registry.len(),
    }))
}

pub async fn describe_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.registry.get(&model_id) {
        Some(artifact) => {
            metrics::inc_request("models_describe", "ok");
            Ok(Json(ModelDetail::from_artifact(&artifact)))
        }
        None => {
            metrics::inc_request("models_describe", "not_found");
            Err(ApiError::not_found(&model_id))
        }
    }
}
