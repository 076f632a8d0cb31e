// inferd/crates/inferd/src/inference/mod.rs

pub mod engine;
pub mod schema;

pub use engine::infer;
pub use schema::{FieldSpec, FieldType, FieldValue, Schema};
