//! Error types for Interview Core.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::StateTransitionError;

/// Unified error type for Interview Core operations.
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed or missing input to a public call.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Engine invariant violation. Always fatal to the request.
    #[error("State transition error: {0}")]
    StateTransition(#[from] StateTransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InterviewError {
    pub fn session_not_found(id: impl std::fmt::Display) -> Self {
        InterviewError::NotFound(format!("Session {} not found", id))
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for InterviewError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            InterviewError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
            }
            InterviewError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            InterviewError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            InterviewError::StateTransition(e) => {
                tracing::error!(from = %e.from, to = %e.to, "Invalid phase transition");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STATE_TRANSITION_ERROR",
                    "An internal error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
            InterviewError::Database(e) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            InterviewError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(msg.clone()),
            ),
            InterviewError::Serialization(e) => (
                StatusCode::BAD_REQUEST,
                "SERIALIZATION_ERROR",
                "Failed to process request/response".to_string(),
                Some(e.to_string()),
            ),
            InterviewError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for Interview Core operations.
pub type InterviewResult<T> = Result<T, InterviewError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;

    #[test]
    fn test_state_transition_maps_to_internal_error() {
        let err: InterviewError = StateTransitionError {
            from: Phase::Completed,
            to: Phase::Greeting,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_and_not_found_statuses() {
        let response = InterviewError::BadRequest("empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = InterviewError::session_not_found("abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = InterviewError::Conflict("dup".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
