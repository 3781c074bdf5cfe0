use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::conversation_store::StoreError;
use crate::relevance::{PollError, RelevanceError};

/// Errors returned by the HTTP handlers, rendered as JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request method")]
    MethodNotAllowed,
    /// Webhook body that is not JSON.
    #[error("Invalid JSON data")]
    InvalidWebhookJson,
    /// Chat-completion body that is not JSON or not a chat request.
    #[error("Invalid JSON in request body")]
    InvalidChatJson,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Failed to trigger agent: {0}")]
    Trigger(#[from] RelevanceError),
    #[error("Missing studio_id or job_id in response")]
    MissingJobInfo,
    #[error("Failed to get agent response after polling")]
    Poll(#[from] PollError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": self.to_string() }),
            ),
            AppError::InvalidWebhookJson | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AppError::InvalidChatJson => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "error", "message": self.to_string() }),
            ),
            AppError::Trigger(_) | AppError::MissingJobInfo => {
                error!(error=%self, "agent trigger failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
            AppError::Poll(e) => {
                error!(error=%e, "agent polling failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
            AppError::Encode(e) => {
                error!(error=%e, "failed to encode stream chunk");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "error", "message": "An internal error occurred" }),
                )
            }
            AppError::Store(e) => {
                error!(error=%e, "conversation store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "error", "message": "An internal error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
