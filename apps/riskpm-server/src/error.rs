//! Error types for the riskpm server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use risk_engine::CompletionError;
use serde::Serialize;
use shared_pdf::ExtractError;
use thiserror::Error;
use tracing::error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Completion service error: {0}")]
    Upstream(String),

    #[error("Completion timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::Decode(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_ERROR", msg.clone())
            }
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ServerError::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NOT_CONFIGURED",
                msg.clone(),
            ),
            ServerError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone()),
            ServerError::Timeout(ms) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                format!("Completion service did not answer within {}ms", ms),
            ),
            ServerError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    msg.clone(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CompletionError> for ServerError {
    fn from(err: CompletionError) -> Self {
        match &err {
            CompletionError::MissingApiKey => ServerError::NotConfigured(err.to_string()),
            CompletionError::Timeout(ms) => ServerError::Timeout(*ms),
            CompletionError::Http(msg) => ServerError::Upstream(msg.clone()),
        }
    }
}

impl From<ExtractError> for ServerError {
    fn from(err: ExtractError) -> Self {
        ServerError::Decode(err.to_string())
    }
}
