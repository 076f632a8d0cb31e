// inferd/crates/inferd/src/inference/schema.rs
//
// Explicit schema descriptors checked at the request boundary. Loose JSON
// never reaches the engine: validation produces typed FieldValues, and the
// numeric fields flatten into the feature vector in declared order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of field types an artifact schema may declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    Integer,
    String,
    Boolean,
    /// Sequence of numbers; `length` pins the arity when known.
    Sequence { length: Option<usize> },
}

impl FieldType {
    pub fn describe(&self) -> String {
        match self {
            FieldType::Number => "number".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Sequence { length: Some(n) } => format!("sequence of {} numbers", n),
            FieldType::Sequence { length: None } => "sequence of numbers".to_string(),
        }
    }

    /// How many feature slots this type occupies, `None` if unknown before
    /// seeing a value. Non-numeric types carry no features.
    fn feature_width(&self) -> Option<usize> {
        match self {
            FieldType::Number | FieldType::Integer => Some(1),
            FieldType::String | FieldType::Boolean => Some(0),
            FieldType::Sequence { length } => *length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

/// Ordered list of named, typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

/// A value that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
    NumberSeq(Vec<f64>),
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total feature-vector width, `None` if any sequence has no pinned
    /// length (such schemas are rejected at artifact load).
    pub fn feature_width(&self) -> Option<usize> {
        let mut total = 0usize;
        for field in &self.fields {
            total += field.ty.feature_width()?;
        }
        Some(total)
    }

    /// Validate a raw request body against this schema. Every declared field
    /// must be present with the declared type; undeclared fields are
    /// rejected. Returns values in schema order.
    pub fn validate(&self, inputs: &Map<String, Value>) -> Result<Vec<FieldValue>, String> {
        for key in inputs.keys() {
            if self.field(key).is_none() {
                return Err(format!("Unexpected field: '{}'", key));
            }
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            let raw = inputs
                .get(&spec.name)
                .ok_or_else(|| format!("Missing field: '{}'", spec.name))?;
            values.push(convert(spec, raw)?);
        }
        Ok(values)
    }
}

fn convert(spec: &FieldSpec, raw: &Value) -> Result<FieldValue, String> {
    let mismatch = || {
        format!(
            "Field '{}' must be a {}",
            spec.name,
            spec.ty.describe()
        )
    };

    match &spec.ty {
        FieldType::Number => raw.as_f64().map(FieldValue::Number).ok_or_else(mismatch),
        FieldType::Integer => raw.as_i64().map(FieldValue::Integer).ok_or_else(mismatch),
        FieldType::String => raw
            .as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        FieldType::Boolean => raw.as_bool().map(FieldValue::Boolean).ok_or_else(mismatch),
        FieldType::Sequence { length } => {
            let items = raw.as_array().ok_or_else(mismatch)?;
            if let Some(expected) = length {
                if items.len() != *expected {
                    return Err(format!(
                        "Field '{}' must contain exactly {} numbers, got {}",
                        spec.name,
                        expected,
                        items.len()
                    ));
                }
            }
            let mut seq = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let n = item.as_f64().ok_or_else(|| {
                    format!("Element {} of '{}' is not a number", idx, spec.name)
                })?;
                seq.push(n);
            }
            Ok(FieldValue::NumberSeq(seq))
        }
    }
}

/// Flatten validated values into the engine's feature vector, in schema
/// order. Text and boolean fields carry no features.
pub fn feature_vector(values: &[FieldValue]) -> Vec<f64> {
    let mut features = Vec::new();
    for value in values {
        match value {
            FieldValue::Number(n) => features.push(*n),
            FieldValue::Integer(i) => features.push(*i as f64),
            FieldValue::NumberSeq(seq) => features.extend_from_slice(seq),
            FieldValue::Text(_) | FieldValue::Boolean(_) => {}
        }
    }
    features
}
