// inferd/crates/inferd/src/api/mod.rs

pub mod admin_api;
pub mod health_api;
pub mod models_api;
pub mod predict_api;

pub use admin_api::reload_models;
pub use health_api::health;
pub use models_api::{describe_model, list_models};
pub use predict_api::{predict, predict_for_model, PredictRequest};
