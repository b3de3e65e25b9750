use axum::{
    extract::rejection::JsonRejection,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::spell::safety::SafetyViolation;
use crate::subscription::store::StoreError;

const GENERIC_UPSTREAM_MESSAGE: &str = "Something went wrong while casting your spell.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "error": "<message>" }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Completion service failure. `status` is the upstream HTTP status when one was received.
    #[error("Upstream error (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream { status, message } => {
                tracing::error!("Upstream error (status {status:?}): {message}");
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = if message.trim().is_empty() {
                    GENERIC_UPSTREAM_MESSAGE.to_string()
                } else {
                    message
                };
                (status, message)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not save your subscription. Please try again later.".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `axum::Json` whose rejections (bad JSON, wrong field types, missing
/// content type) render as a 400 `AppError` instead of axum's plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, message } => AppError::Upstream {
                status: Some(status),
                message,
            },
            LlmError::Http(e) => AppError::Upstream {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            other => AppError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<SafetyViolation> for AppError {
    fn from(violation: SafetyViolation) -> Self {
        AppError::Validation(violation.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidEmail => AppError::Validation(err.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}
