// inferd/crates/inferd/src/server.rs
//
// Service bootstrap. The registry is built before the listener binds, so
// readiness gating is structural: no connection is accepted until at least
// one model loaded. Shutdown drains in-flight requests up to a bounded
// grace period.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::registry::{loader, RegistryHandle};
use crate::state::AppState;

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing();
    crate::metrics::init_metrics();
    cfg.print_config();

    info!("Loading model registry from {}", cfg.models_dir.display());
    let registry = loader::load_dir(&cfg.models_dir)?;
    if registry.is_empty() {
        anyhow::bail!(
            "no loadable model artifacts in {}; refusing to start",
            cfg.models_dir.display()
        );
    }
    crate::metrics::set_models_loaded(registry.len());
    info!("Registry ready with {} model(s)", registry.len());

    let handle = RegistryHandle::new(registry, cfg.models_dir.clone());
    let state = AppState::new(cfg.clone(), handle);

    let addr = format!("{}:{}", cfg.api_host, cfg.api_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    info!("Accepting connections on {}", addr);

    let app = build_router(state);

    let drain = Arc::new(Notify::new());
    let drain_signal = drain.clone();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { drain_signal.notified().await })
            .into_future(),
    );

    shutdown_signal().await;
    info!(
        "Shutdown signal received, draining in-flight requests (up to {}s)",
        cfg.shutdown_grace_seconds
    );
    drain.notify_one();

    match tokio::time::timeout(cfg.shutdown_grace(), server).await {
        Ok(joined) => joined??,
        Err(_) => warn!("Drain grace period expired with requests still in flight"),
    }

    info!("Server stopped");
    Ok(())
}

/// Build the service router. Public so integration tests can drive the full
/// stack without binding a port.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::{
        cors::{Any, CorsLayer},
        limit::RequestBodyLimitLayer,
        timeout::TimeoutLayer,
        trace::TraceLayer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Outer safety net above the per-request inference timeout.
    let outer_timeout = Duration::from_secs(state.cfg.request_timeout_seconds + 5);
    let max_body = state.cfg.max_body_bytes;

    axum::Router::new()
        .route("/predict", post(crate::api::predict_api::predict))
        .route("/models", get(crate::api::models_api::list_models))
        .route("/models/:model", get(crate::api::models_api::describe_model))
        .route("/models/:model/predict", post(crate::api::predict_api::predict_for_model))
        .route("/admin/reload", post(crate::api::admin_api::reload_models))
        .route("/health", get(crate::api::health_api::health))
        .route("/metrics", get(crate::metrics::get_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(outer_timeout))
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
