use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tts_core::NarrationError;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error response structure: one structured terminal failure per request
#[derive(Serialize)]
struct ErrorResponse {
    #[serde(rename = "errorKind")]
    error_kind: &'static str,
    message: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_kind, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            ApiError::Narration(NarrationError::UpstreamScript(e)) => {
                tracing::error!("script generation failed: {e:#}");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_script_error",
                    format!("script generation failed: {e}"),
                )
            }
            ApiError::Narration(err @ NarrationError::FallbackExhausted { .. }) => {
                tracing::error!("both synthesis paths failed: {err}");
                (StatusCode::BAD_GATEWAY, "fallback_exhausted", err.to_string())
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = Json(ErrorResponse {
            error_kind,
            message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
