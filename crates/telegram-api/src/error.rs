//! Error types for telegram-api.

use thiserror::Error;

/// Errors that can occur when talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the Bot API.
    #[error("API error {code}: {description}")]
    Api { code: i32, description: String },

    /// Connection to the API server failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Bot token was rejected by getMe.
    #[error("Authentication failed")]
    AuthFailed,
}
