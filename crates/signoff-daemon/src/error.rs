//! Error types for the signoff daemon.

use approval_engine::WorkflowError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notify_dispatch::DispatchError;
use notify_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-facing errors. Workflow refusals keep their own wording; the
/// mapping below only picks the status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing X-Actor-Id header")]
    MissingActor,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Workflow(e) => ApiError::Workflow(e),
            DispatchError::Store(e) => ApiError::Store(e),
            DispatchError::Directory(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::MissingActor => (StatusCode::UNAUTHORIZED, "MISSING_ACTOR"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Workflow(error) => workflow_status(error),
            ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

fn workflow_status(error: &WorkflowError) -> (StatusCode, &'static str) {
    match error {
        WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        WorkflowError::UnknownActor(_) => (StatusCode::FORBIDDEN, "UNKNOWN_ACTOR"),
        WorkflowError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        WorkflowError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        WorkflowError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        WorkflowError::Directory(_) | WorkflowError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
