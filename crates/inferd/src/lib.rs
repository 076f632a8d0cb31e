// inferd/crates/inferd/src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod registry;
pub mod server;
pub mod state;
pub mod telemetry;

// Public API exports
pub use config::Config;
pub use error::{ApiError, ErrorKind};
pub use registry::{ModelArtifact, ModelPayload, Registry, RegistryHandle};
pub use server::{build_router, run_server};
pub use state::AppState;
