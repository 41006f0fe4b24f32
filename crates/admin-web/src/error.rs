//! Error types for the admin backend.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors that can occur in the admin backend.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Workflow error.
    #[error("Workflow error: {0}")]
    Workflow(#[from] workflow::WorkflowError),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AdminError::Database(database::DatabaseError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                format!("{} {} not found", entity, id),
            ),
            AdminError::Database(database::DatabaseError::AlreadyExists { entity, id }) => (
                StatusCode::CONFLICT,
                format!("{} {} already exists", entity, id),
            ),
            AdminError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AdminError::Workflow(err) => {
                tracing::error!("Workflow error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AdminError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
