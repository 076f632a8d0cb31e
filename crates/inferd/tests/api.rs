// inferd/crates/inferd/tests/api.rs
//
// End-to-end tests through the router, no port binding.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use inferd::config::Config;
use inferd::registry::{loader, RegistryHandle};
use inferd::server::build_router;
use inferd::state::AppState;

fn classifier_manifest() -> Value {
    json!({
        "name": "classifier-v1",
        "version": "1",
        "input_schema": {
            "fields": [{"name": "features", "type": {"sequence": {"length": 4}}}]
        },
        "output_schema": {
            "fields": [
                {"name": "label", "type": "string"},
                {"name": "score", "type": "number"}
            ]
        },
        "model": {
            "kind": "linear_classifier",
            "weights": [0.4, 0.3, 0.2, 0.1],
            "bias": 0.0,
            "threshold": 0.5,
            "labels": ["B", "A"]
        }
    })
}

fn regressor_manifest() -> Value {
    json!({
        "name": "precip-v1",
        "input_schema": {
            "fields": [{"name": "features", "type": {"sequence": {"length": 2}}}]
        },
        "output_schema": {
            "fields": [{"name": "value", "type": "number"}]
        },
        "model": {
            "kind": "linear_regressor",
            "weights": [1.5, -0.5],
            "bias": 0.25,
            "clamp_min": 0.0,
            "round_decimals": 2
        }
    })
}

fn fixture_state(max_concurrent: usize) -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("classifier-v1.json"),
        classifier_manifest().to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("precip-v1.json"),
        regressor_manifest().to_string(),
    )
    .unwrap();

    let registry = loader::load_dir(dir.path()).unwrap();
    let cfg = Config {
        models_dir: dir.path().to_path_buf(),
        max_concurrent_requests: max_concurrent,
        ..Config::default()
    };
    let state = AppState::new(cfg, RegistryHandle::new(registry, dir.path().to_path_buf()));
    (dir, state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn predict_returns_label_and_score() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"model": "classifier-v1", "features": [1.0, 2.0, 3.0, 4.0]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], json!("A"));
    let score = body["score"].as_f64().unwrap();
    assert!(score > 0.5 && score <= 1.0);
}

#[tokio::test]
async fn predict_rejects_wrong_field_types() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"model": "classifier-v1", "features": ["a", "b"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("ValidationError"));
}

#[tokio::test]
async fn malformed_json_body_still_speaks_the_error_contract() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("ValidationError"));
    assert_eq!(body["code"], json!(400));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn predict_unknown_model_is_404() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(post_json("/predict", json!({"model": "unknown"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("NotFoundError"));
}

#[tokio::test]
async fn predict_requires_model_field() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(post_json("/predict", json!({"features": [1.0, 2.0, 3.0, 4.0]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("ValidationError"));
}

#[tokio::test]
async fn per_model_path_ignores_body_model_key() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/models/precip-v1/predict",
            json!({"model": "classifier-v1", "features": [2.0, 1.0]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // 1.5*2 - 0.5*1 + 0.25
    assert_eq!(body["value"], json!(2.75));
}

#[tokio::test]
async fn health_reports_readiness() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ready"], json!(true));
    assert_eq!(body["models_loaded"], json!(2));
}

#[tokio::test]
async fn list_and_describe_models() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let response = app.clone().oneshot(get("/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["models"][0]["name"], json!("classifier-v1"));

    let response = app.clone().oneshot(get("/models/classifier-v1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["kind"], json!("linear_classifier"));
    assert_eq!(
        body["input_schema"]["fields"][0]["name"],
        json!("features")
    );

    let response = app.oneshot(get("/models/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exhausted_permits_return_503() {
    let (_dir, state) = fixture_state(0);
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"model": "classifier-v1", "features": [1.0, 2.0, 3.0, 4.0]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("OverloadError"));
}

#[test]
fn exceeded_timeout_returns_504_within_bounded_time() {
    // A zero-second budget expires before the blocking inference task gets
    // polled to completion, so the handler must come back promptly with the
    // timeout kind instead of waiting on the result. The runtime has a single
    // blocking thread which a sleeper occupies before the request is sent, so
    // the inference task queues behind it and cannot win the race against the
    // deadline.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(1)
        .build()
        .unwrap();
    rt.block_on(async {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("classifier-v1.json"),
            classifier_manifest().to_string(),
        )
        .unwrap();
        let registry = loader::load_dir(dir.path()).unwrap();
        let cfg = Config {
            models_dir: dir.path().to_path_buf(),
            request_timeout_seconds: 0,
            ..Config::default()
        };
        let state = AppState::new(cfg, RegistryHandle::new(registry, dir.path().to_path_buf()));
        let app = build_router(state);

        let _blocker = tokio::task::spawn_blocking(|| {
            std::thread::sleep(std::time::Duration::from_secs(2));
        });
        tokio::task::yield_now().await;

        let started = std::time::Instant::now();
        let response = app
            .oneshot(post_json(
                "/predict",
                json!({"model": "classifier-v1", "features": [1.0, 2.0, 3.0, 4.0]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("TimeoutError"));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    });
}

#[tokio::test]
async fn concurrent_identical_requests_are_deterministic_and_isolated() {
    let (_dir, state) = fixture_state(8);
    let app = build_router(state);

    let request = || {
        post_json(
            "/predict",
            json!({"model": "classifier-v1", "features": [0.5, -0.25, 1.75, 0.0]}),
        )
    };

    let (a, b, c, d) = tokio::join!(
        app.clone().oneshot(request()),
        app.clone().oneshot(request()),
        app.clone().oneshot(request()),
        app.clone().oneshot(request()),
    );

    let first = body_json(a.unwrap()).await;
    for response in [b.unwrap(), c.unwrap(), d.unwrap()] {
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, first);
    }
}

#[tokio::test]
async fn reload_picks_up_new_artifacts() {
    let (dir, state) = fixture_state(8);
    let app = build_router(state);

    let mut extra = classifier_manifest();
    extra["name"] = json!("classifier-v2");
    std::fs::write(dir.path().join("classifier-v2.json"), extra.to_string()).unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/admin/reload", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reloaded"], json!(3));

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"model": "classifier-v2", "features": [1.0, 2.0, 3.0, 4.0]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
