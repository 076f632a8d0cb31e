// inferd/crates/inferd/src/error.rs

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

/// Stable error kinds exposed at the network boundary. The wire name is
/// part of the API contract; clients match on it, not on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    NotFound,
    Validation,
    Inference,
    Timeout,
    Overload,
}

impl ErrorKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            ErrorKind::Load => "LoadError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Inference => "InferenceError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Overload => "OverloadError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Load => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Inference => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Overload => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Per-request error carrying a stable kind and a client-safe message.
/// Internal detail (paths, backtraces) stays in the logs, never on the wire.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn not_found(model_id: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: format!("Unknown model: {}", model_id),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Inference,
            message: message.into(),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: format!("Inference exceeded the {}s request timeout", seconds),
        }
    }

    pub fn overload() -> Self {
        Self {
            kind: ErrorKind::Overload,
            message: "Server is at capacity, retry later".to_string(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Load,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.wire_name(), self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.kind.status();
        (
            status,
            axum::Json(json!({
                "error": self.kind.wire_name(),
                "message": self.message,
                "code": status.as_u16(),
            })),
        )
            .into_response()
    }
}

/// JSON extractor whose rejection speaks the error contract. A body that
/// does not parse must still come back as `{error, message, code}` with a
/// stable kind, not axum's plain-text rejection.
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
