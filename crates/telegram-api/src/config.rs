//! Configuration types for telegram-api.

/// Configuration for connecting to the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Base URL of the Bot API server (e.g., "https://api.telegram.org").
    /// Overridable for local Bot API servers and tests.
    pub base_url: String,
    /// Bot token issued by BotFather.
    pub token: String,
    /// Long-poll timeout in seconds for getUpdates.
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    /// Create a new configuration with the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.telegram.org".to_string(),
            token: token.into(),
            poll_timeout_secs: 30,
        }
    }

    /// Create configuration targeting a non-default API server.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(token)
        }
    }

    /// Get the endpoint URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}
