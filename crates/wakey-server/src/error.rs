use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wakey_core::adapters::AdapterError;
use wakey_core::error::WakeyError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 409 through the `anyhow::Error` chain.
#[derive(Debug)]
struct ConflictError(String);

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConflictError {}

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(ConflictError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(WakeyError::AlarmNotFound(msg.into()).into())
    }

    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(c) = self.0.downcast_ref::<ConflictError>() {
            let body = serde_json::json!({ "error": c.0.clone() });
            return (StatusCode::CONFLICT, axum::Json(body)).into_response();
        }
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<AdapterError>() {
            adapter_status(e)
        } else if let Some(e) = self.0.downcast_ref::<WakeyError>() {
            domain_status(e)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_status(e: &WakeyError) -> StatusCode {
    match e {
        WakeyError::AlarmNotFound(_) => StatusCode::NOT_FOUND,
        WakeyError::InvalidTime(_) | WakeyError::InvalidAlarm(_) => StatusCode::BAD_REQUEST,
        WakeyError::InvalidTransition { .. } => StatusCode::CONFLICT,
        WakeyError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        WakeyError::Io(_) | WakeyError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Device trouble is the upstream's fault, never the caller's.
fn adapter_status(e: &AdapterError) -> StatusCode {
    match e {
        AdapterError::NotConfigured(_) | AdapterError::Unavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AdapterError::Http(_) | AdapterError::Rejected(_) | AdapterError::Spawn(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
