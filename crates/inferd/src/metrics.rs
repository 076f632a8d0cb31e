// inferd/crates/inferd/src/metrics.rs

use prometheus::{Encoder, TextEncoder, Registry, IntCounterVec, IntGauge, Histogram};
use lazy_static::lazy_static;
use std::sync::OnceLock;
use axum::response::IntoResponse;
use axum::http::StatusCode;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static INFLIGHT_REQUESTS: OnceLock<IntGauge> = OnceLock::new();
static MODELS_LOADED: OnceLock<IntGauge> = OnceLock::new();
static INFERENCE_DURATION: OnceLock<Histogram> = OnceLock::new();

pub fn init_metrics() {
    let req_counter = REQ_COUNTER.get_or_init(|| {
        IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"]
        ).unwrap()
    });

    let inflight = INFLIGHT_REQUESTS.get_or_init(|| {
        IntGauge::new("inflight_requests", "Prediction requests currently executing").unwrap()
    });

    let models_loaded = MODELS_LOADED.get_or_init(|| {
        IntGauge::new("models_loaded", "Model artifacts in the active registry snapshot").unwrap()
    });

    let inference_duration = INFERENCE_DURATION.get_or_init(|| {
        Histogram::with_opts(prometheus::HistogramOpts::new(
            "inference_duration_seconds",
            "Wall-clock time spent in model inference"
        )).unwrap()
    });

    REGISTRY.register(Box::new(req_counter.clone())).ok();
    REGISTRY.register(Box::new(inflight.clone())).ok();
    REGISTRY.register(Box::new(models_loaded.clone())).ok();
    REGISTRY.register(Box::new(inference_duration.clone())).ok();
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn inc_inflight() {
    if let Some(gauge) = INFLIGHT_REQUESTS.get() {
        gauge.inc();
    }
}

pub fn dec_inflight() {
    if let Some(gauge) = INFLIGHT_REQUESTS.get() {
        gauge.dec();
    }
}

pub fn set_models_loaded(count: usize) {
    if let Some(gauge) = MODELS_LOADED.get() {
        gauge.set(count as i64);
    }
}

pub fn observe_inference(duration: f64) {
    if let Some(histogram) = INFERENCE_DURATION.get() {
        histogram.observe(duration);
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
