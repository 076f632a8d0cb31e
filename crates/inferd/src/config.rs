// inferd/crates/inferd/src/config.rs

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub models_dir: PathBuf,
    pub request_timeout_seconds: u64,
    pub max_concurrent_requests: usize,
    pub max_body_bytes: usize,
    pub shutdown_grace_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        let models_dir = PathBuf::from(env::var("MODELS_DIR").unwrap_or_else(|_| "models".into()));
        if !models_dir.is_dir() {
            warn!(
                "Models directory does not exist yet: {}. Startup will fail unless it appears with at least one artifact.",
                models_dir.display()
            );
        }

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "8000".into()).parse()?,
            models_dir,
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
            max_concurrent_requests: env::var("MAX_CONCURRENT_REQUESTS")
                .unwrap_or_else(|_| "64".into())
                .parse()?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "1048576".into())
                .parse()?,
            shutdown_grace_seconds: env::var("SHUTDOWN_GRACE_SECONDS")
                .unwrap_or_else(|_| "25".into())
                .parse()?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }

    pub fn print_config(&self) {
        info!("Configuration:");
        info!("  API: {}:{}", self.api_host, self.api_port);
        info!("  Models directory: {}", self.models_dir.display());
        info!("  Request timeout: {}s", self.request_timeout_seconds);
        info!("  Max concurrent requests: {}", self.max_concurrent_requests);
        info!("  Max body size: {} bytes", self.max_body_bytes);
        info!("  Shutdown grace: {}s", self.shutdown_grace_seconds);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            models_dir: PathBuf::from("models"),
            request_timeout_seconds: 30,
            max_concurrent_requests: 64,
            max_body_bytes: 1_048_576,
            shutdown_grace_seconds: 25,
        }
    }
}
