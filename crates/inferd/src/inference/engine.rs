// inferd/crates/inferd/src/inference/engine.rs
//
// Deterministic inference over validated inputs. Pure function of
// (artifact, values): no shared mutable state, no randomness, so concurrent
// calls against the same artifact need no locking. Numeric failures surface
// as errors, never panics.

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::inference::schema::{feature_vector, FieldValue};
use crate::registry::artifact::{ModelArtifact, ModelPayload};

/// Run the artifact's model over validated input values. The result object
/// uses the output field names the artifact declares.
pub fn infer(artifact: &ModelArtifact, values: &[FieldValue]) -> Result<Map<String, Value>> {
    let features = feature_vector(values);
    let dimension = artifact.model.dimension();
    if features.len() != dimension {
        bail!(
            "feature vector has {} entries, model '{}' expects {}",
            features.len(),
            artifact.name,
            dimension
        );
    }

    let mut output = Map::new();
    match &artifact.model {
        ModelPayload::LinearClassifier { weights, bias, threshold, labels, label_field, score_field } => {
            let z = finite(dot(weights, &features) + bias)?;
            // Score is always the positive-class probability, regardless of
            // which label wins.
            let score = sigmoid(z);
            let label = if score >= *threshold { &labels[1] } else { &labels[0] };
            output.insert(label_field.clone(), json!(label));
            output.insert(score_field.clone(), json!(score));
        }
        ModelPayload::MulticlassClassifier { weights, biases, labels, label_field, score_field } => {
            let mut logits = Vec::with_capacity(weights.len());
            for (row, bias) in weights.iter().zip(biases) {
                logits.push(finite(dot(row, &features) + bias)?);
            }
            let probs = softmax(&logits);
            // Ties resolve to the lowest class index, keeping output
            // deterministic.
            let best = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal).then(b.0.cmp(&a.0)))
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            output.insert(label_field.clone(), json!(labels[best]));
            output.insert(score_field.clone(), json!(probs[best]));
        }
        ModelPayload::LinearRegressor { weights, bias, clamp_min, clamp_max, round_decimals, value_field } => {
            let mut v = finite(dot(weights, &features) + bias)?;
            if let Some(lo) = clamp_min {
                v = v.max(*lo);
            }
            if let Some(hi) = clamp_max {
                v = v.min(*hi);
            }
            if let Some(decimals) = round_decimals {
                let factor = 10f64.powi(*decimals as i32);
                v = (v * factor).round() / factor;
            }
            output.insert(value_field.clone(), json!(finite(v)?));
        }
    }

    Ok(output)
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Numerically stable softmax (max-subtraction before exp).
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

fn finite(x: f64) -> Result<f64> {
    if x.is_finite() {
        Ok(x)
    } else {
        bail!("computation produced a non-finite value");
    }
}
