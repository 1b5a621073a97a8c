use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::schema::{FieldIssue, ValidationFailure};
use crate::transform::TransformError;

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid request body: {0}")]
    Validation(ValidationFailure),

    #[error("invalid path parameters: {0}")]
    InvalidParams(ValidationFailure),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) | ApiError::Validation(_) | ApiError::InvalidParams(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MalformedJson(e) => json!({
                "error": "Invalid JSON body",
                "details": [FieldIssue { field: String::new(), message: e.to_string() }],
            }),
            ApiError::Validation(failure) => json!({
                "error": "Validation failed",
                "details": failure.issues,
            }),
            ApiError::InvalidParams(failure) => json!({
                "error": "Invalid parameters",
                "details": failure.issues,
            }),
            ApiError::NotFound(message) | ApiError::Conflict(message) => json!({
                "error": message,
            }),
            ApiError::Transform(e) => {
                tracing::error!(error = %e, "webhook transform failed");
                json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
