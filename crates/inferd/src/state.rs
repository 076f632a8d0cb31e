// inferd/crates/inferd/src/state.rs
//
// Application state shared with all handlers. Everything here is either
// immutable after startup (config), an atomic snapshot (registry), or a
// concurrency primitive (the in-flight permit pool); handlers share no other
// mutable state.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::registry::RegistryHandle;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<RegistryHandle>,
    /// Bounded concurrency for prediction requests; exhausted permits mean
    /// 503, not an unbounded queue.
    pub inflight: Arc<Semaphore>,
}

impl AppState {
    pub fn new(cfg: Config, registry: RegistryHandle) -> Self {
        let inflight = Arc::new(Semaphore::new(cfg.max_concurrent_requests));
        Self {
            cfg: Arc::new(cfg),
            registry: Arc::new(registry),
            inflight,
        }
    }
}
