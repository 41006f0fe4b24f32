//! Error types for the workflow crate.

use thiserror::Error;

/// Errors that can occur while running payment workflows.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// User input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] database::ValidationError),

    /// Telegram API call failed.
    #[error("Telegram error: {0}")]
    Telegram(#[from] telegram_api::TelegramError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller is not allowed to perform this operation.
    #[error("Not authorized")]
    NotAuthorized,
}
