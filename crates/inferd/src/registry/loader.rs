// inferd/crates/inferd/src/registry/loader.rs
//
// Startup-time discovery of model artifacts. One corrupt manifest never
// aborts the rest of the scan; it is logged and skipped. Whether an empty
// result is fatal is the caller's decision (fatal at startup, rejected on
// reload).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::artifact::ModelArtifact;
use super::Registry;

/// Scan a directory for `*.json` artifact manifests and build a registry
/// snapshot from the ones that load and validate.
pub fn load_dir(dir: &Path) -> Result<Registry> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read models directory {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect();
    // Deterministic load order so duplicate handling is reproducible.
    paths.sort();

    let mut models: HashMap<String, Arc<ModelArtifact>> = HashMap::new();
    let mut skipped = 0usize;
    for path in &paths {
        match load_artifact(path) {
            Ok(artifact) => {
                if models.contains_key(&artifact.name) {
                    warn!(
                        "Skipping {}: duplicate model name '{}'",
                        path.display(),
                        artifact.name
                    );
                    skipped += 1;
                    continue;
                }
                info!(
                    "Loaded model '{}' v{} ({}, {} features) from {}",
                    artifact.name,
                    artifact.version,
                    artifact.model.kind_name(),
                    artifact.model.dimension(),
                    path.display()
                );
                models.insert(artifact.name.clone(), Arc::new(artifact));
            }
            Err(e) => {
                warn!("Skipping unloadable artifact {}: {:#}", path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} artifact(s) in {}", skipped, dir.display());
    }
    Ok(Registry::new(models))
}

/// Load and validate a single artifact manifest.
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let artifact: ModelArtifact =
        serde_json::from_str(&raw).context("not a valid artifact manifest")?;
    artifact.validate()?;
    Ok(artifact)
}
