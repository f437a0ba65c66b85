use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_core::PulseError;
use serde_json::json;
use std::any::Any;
use tracing::{error, warn};

/// Maps a [`PulseError`] to a JSON error body with a 5xx status.
#[derive(Debug)]
pub struct ApiError(pub PulseError);

impl From<PulseError> for ApiError {
    fn from(err: PulseError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PulseError::NoSamples => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(error = %self.0, "request served before first sample");
        } else {
            error!(error = %self.0, "request failed");
        }
        error_body(status, self.0.to_string())
    }
}

/// Response for a handler that panicked: the same JSON shape as [`ApiError`].
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "handler panicked");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {detail}"))
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
