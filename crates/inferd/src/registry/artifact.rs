// inferd/crates/inferd/src/registry/artifact.rs
//
// Self-describing model artifact manifest. An artifact is immutable once
// loaded; `validate` runs before it becomes visible to request handling, so
// a self-inconsistent manifest never reaches the engine.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::inference::schema::{FieldType, Schema};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub model: ModelPayload,
}

fn default_version() -> String { "1".to_string() }
fn default_threshold() -> f64 { 0.5 }
fn default_label_field() -> String { "label".to_string() }
fn default_score_field() -> String { "score".to_string() }
fn default_value_field() -> String { "value".to_string() }

/// Closed set of supported model kinds, dispatched by tag. Adding a format
/// means adding a variant here plus its arm in the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelPayload {
    /// Binary classifier: sigmoid(w.x + b) against a decision threshold.
    LinearClassifier {
        weights: Vec<f64>,
        bias: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        /// [negative label, positive label]
        labels: [String; 2],
        #[serde(default = "default_label_field")]
        label_field: String,
        #[serde(default = "default_score_field")]
        score_field: String,
    },
    /// One weight row per class; softmax scores, argmax label.
    MulticlassClassifier {
        weights: Vec<Vec<f64>>,
        biases: Vec<f64>,
        labels: Vec<String>,
        #[serde(default = "default_label_field")]
        label_field: String,
        #[serde(default = "default_score_field")]
        score_field: String,
    },
    /// w.x + b with optional output clamp and rounding.
    LinearRegressor {
        weights: Vec<f64>,
        bias: f64,
        #[serde(default)]
        clamp_min: Option<f64>,
        #[serde(default)]
        clamp_max: Option<f64>,
        #[serde(default)]
        round_decimals: Option<u32>,
        #[serde(default = "default_value_field")]
        value_field: String,
    },
}

impl ModelPayload {
    /// Feature dimension the payload expects.
    pub fn dimension(&self) -> usize {
        match self {
            ModelPayload::LinearClassifier { weights, .. } => weights.len(),
            ModelPayload::MulticlassClassifier { weights, .. } => {
                weights.first().map(|row| row.len()).unwrap_or(0)
            }
            ModelPayload::LinearRegressor { weights, .. } => weights.len(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelPayload::LinearClassifier { .. } => "linear_classifier",
            ModelPayload::MulticlassClassifier { .. } => "multiclass_classifier",
            ModelPayload::LinearRegressor { .. } => "linear_regressor",
        }
    }
}

impl ModelArtifact {
    /// Self-consistency check run at load time, before registration.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("artifact name is empty");
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            bail!("artifact name '{}' contains invalid characters", self.name);
        }

        let dimension = self.model.dimension();
        if dimension == 0 {
            bail!("model '{}' has no weights", self.name);
        }
        match self.input_schema.feature_width() {
            Some(width) if width == dimension => {}
            Some(width) => bail!(
                "model '{}': input schema provides {} features but the model expects {}",
                self.name, width, dimension
            ),
            None => bail!(
                "model '{}': input schema contains a sequence without a pinned length",
                self.name
            ),
        }

        match &self.model {
            ModelPayload::LinearClassifier { threshold, label_field, score_field, .. } => {
                if !(0.0..=1.0).contains(threshold) {
                    bail!("model '{}': threshold {} outside [0, 1]", self.name, threshold);
                }
                self.require_output(label_field, &FieldType::String)?;
                self.require_output(score_field, &FieldType::Number)?;
            }
            ModelPayload::MulticlassClassifier { weights, biases, labels, label_field, score_field } => {
                if labels.len() < 2 {
                    bail!("model '{}': multiclass classifier needs at least 2 labels", self.name);
                }
                if weights.len() != labels.len() || biases.len() != labels.len() {
                    bail!(
                        "model '{}': {} weight rows / {} biases for {} labels",
                        self.name, weights.len(), biases.len(), labels.len()
                    );
                }
                if weights.iter().any(|row| row.len() != dimension) {
                    bail!("model '{}': weight rows have inconsistent lengths", self.name);
                }
                self.require_output(label_field, &FieldType::String)?;
                self.require_output(score_field, &FieldType::Number)?;
            }
            ModelPayload::LinearRegressor { clamp_min, clamp_max, value_field, .. } => {
                if let (Some(lo), Some(hi)) = (clamp_min, clamp_max) {
                    if lo > hi {
                        bail!("model '{}': clamp_min {} above clamp_max {}", self.name, lo, hi);
                    }
                }
                self.require_output(value_field, &FieldType::Number)?;
            }
        }

        Ok(())
    }

    fn require_output(&self, field: &str, expected: &FieldType) -> Result<()> {
        match self.output_schema.field(field) {
            Some(spec) if &spec.ty == expected => Ok(()),
            Some(spec) => bail!(
                "model '{}': output field '{}' is declared as {} but the model produces a {}",
                self.name, field, spec.ty.describe(), expected.describe()
            ),
            None => bail!(
                "model '{}': output schema is missing field '{}'",
                self.name, field
            ),
        }
    }
}
