// inferd/crates/inferd/src/registry/mod.rs
//
// In-memory registry of loaded model artifacts. A snapshot is immutable;
// readers load it lock-free through ArcSwap and reload is a whole-snapshot
// swap, so in-flight requests keep the snapshot they started with.

pub mod artifact;
pub mod loader;

pub use artifact::{ModelArtifact, ModelPayload};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use arc_swap::ArcSwap;
use tracing::info;

/// Immutable mapping from model name to artifact.
pub struct Registry {
    models: HashMap<String, Arc<ModelArtifact>>,
}

impl Registry {
    pub fn new(models: HashMap<String, Arc<ModelArtifact>>) -> Self {
        Self { models }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelArtifact>> {
        self.models.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Artifacts in stable name order.
    pub fn artifacts(&self) -> Vec<Arc<ModelArtifact>> {
        let mut list: Vec<Arc<ModelArtifact>> = self.models.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

/// Handle shared with request handlers: lock-free snapshot reads and an
/// atomic reload path tied to the models directory it was built from.
pub struct RegistryHandle {
    snapshot: ArcSwap<Registry>,
    models_dir: PathBuf,
}

impl RegistryHandle {
    pub fn new(initial: Registry, models_dir: PathBuf) -> Self {
        Self {
            snapshot: ArcSwap::new(Arc::new(initial)),
            models_dir,
        }
    }

    pub fn snapshot(&self) -> Arc<Registry> {
        self.snapshot.load_full()
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelArtifact>> {
        self.snapshot.load().get(name)
    }

    /// Rebuild the registry from disk and swap it in atomically. A scan
    /// that would leave the registry empty is rejected and the current
    /// snapshot stays active, matching the startup fail-fast rule.
    pub fn reload(&self) -> Result<usize> {
        info!("Reloading model registry from {}", self.models_dir.display());
        let fresh = loader::load_dir(&self.models_dir)?;
        if fresh.is_empty() {
            bail!(
                "reload found no loadable artifacts in {}, keeping the current snapshot",
                self.models_dir.display()
            );
        }
        let count = fresh.len();
        self.snapshot.store(Arc::new(fresh));
        info!("Registry reloaded with {} model(s)", count);
        Ok(count)
    }
}
