//! Telegram Bot API HTTP client.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackParams, Message, SendDocumentParams, SendMessageParams, SendPhotoParams, Update,
    User,
};

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    description: Option<String>,
}

/// Parameters for getUpdates.
#[derive(Debug, Serialize)]
struct GetUpdatesParams {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct LeaveChatParams {
    chat_id: i64,
}

/// Client for communicating with the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: BotConfig,
    /// Next getUpdates offset (last seen update_id + 1).
    offset: Arc<AtomicI64>,
}

impl TelegramClient {
    /// Connect to the Bot API and verify the token with getMe.
    pub async fn connect(config: BotConfig) -> Result<Self, TelegramError> {
        // Long-poll requests block for poll_timeout_secs server-side, so the
        // HTTP timeout must exceed it.
        let http = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 15))
            .build()
            .map_err(TelegramError::Http)?;

        let client = Self {
            http,
            config,
            offset: Arc::new(AtomicI64::new(0)),
        };

        let me = client.get_me().await.map_err(|e| match e {
            TelegramError::Api { .. } => TelegramError::AuthFailed,
            other => other,
        })?;
        info!(
            "Connected to Telegram as @{}",
            me.username.as_deref().unwrap_or("<unknown>")
        );

        Ok(client)
    }

    /// Get the bot's own account info.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for the next batch of updates.
    ///
    /// Advances the internal offset so each update is delivered once.
    pub async fn get_updates(&self) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdatesParams {
            offset: self.offset.load(Ordering::SeqCst),
            timeout: self.config.poll_timeout_secs,
            allowed_updates: &["message", "callback_query", "my_chat_member"],
        };

        let updates: Vec<Update> = self.call("getUpdates", &params).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }

        Ok(updates)
    }

    /// Send a text message.
    pub async fn send_message(&self, params: SendMessageParams) -> Result<Message, TelegramError> {
        self.call("sendMessage", &params).await
    }

    /// Re-send a document by file_id.
    pub async fn send_document(
        &self,
        params: SendDocumentParams,
    ) -> Result<Message, TelegramError> {
        self.call("sendDocument", &params).await
    }

    /// Re-send a photo by file_id.
    pub async fn send_photo(&self, params: SendPhotoParams) -> Result<Message, TelegramError> {
        self.call("sendPhoto", &params).await
    }

    /// Acknowledge a callback query, optionally with a toast message.
    pub async fn answer_callback(
        &self,
        callback_query_id: impl Into<String>,
        text: Option<String>,
    ) -> Result<(), TelegramError> {
        let params = AnswerCallbackParams {
            callback_query_id: callback_query_id.into(),
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &params).await?;
        Ok(())
    }

    /// Leave a group chat.
    pub async fn leave_chat(&self, chat_id: i64) -> Result<(), TelegramError> {
        let _: bool = self.call("leaveChat", &LeaveChatParams { chat_id }).await?;
        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Make a Bot API method call.
    async fn call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, TelegramError> {
        let url = self.config.method_url(method);
        debug!("API call: {}", method);

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(TelegramError::Http)?;

        let status = response.status();
        let api: ApiResponse<R> = response.json().await.map_err(|e| {
            TelegramError::Connection(format!("HTTP {}: invalid response body: {}", status, e))
        })?;

        if !api.ok {
            return Err(TelegramError::Api {
                code: api.error_code.unwrap_or(-1),
                description: api
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        api.result.ok_or_else(|| TelegramError::Api {
            code: -1,
            description: "No result in response".to_string(),
        })
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.config.base_url)
            .field("offset", &self.offset.load(Ordering::SeqCst))
            .finish()
    }
}
