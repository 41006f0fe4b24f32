//! Telegram Bot API client library.
//!
//! This crate provides a minimal client for the parts of the Bot API the
//! payment-tracking bot needs:
//!
//! - Long-polling for updates via getUpdates
//! - Sending text messages with inline keyboards
//! - Re-sending documents and photos by file_id
//! - Answering callback queries and leaving chats
//!
//! # Example
//!
//! ```no_run
//! use telegram_api::{BotConfig, TelegramClient, SendMessageParams};
//!
//! # async fn example() -> Result<(), telegram_api::TelegramError> {
//! let client = TelegramClient::connect(BotConfig::new("123:abc")).await?;
//!
//! loop {
//!     for update in client.get_updates().await? {
//!         if let Some(msg) = update.message {
//!             client
//!                 .send_message(SendMessageParams::text(msg.chat.id, "Salom!"))
//!                 .await?;
//!         }
//!     }
//! }
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use config::BotConfig;
pub use error::TelegramError;
pub use types::*;
