//! Telegram-backed implementation of [`MessageSender`].

use async_trait::async_trait;
use telegram_api::{
    InlineKeyboardMarkup, SendDocumentParams, SendMessageParams, SendPhotoParams, TelegramClient,
};

use crate::error::WorkflowError;
use crate::sender::{ButtonRows, FileKind, MessageSender, StoredFile};

/// Sends messages through the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    client: TelegramClient,
}

impl TelegramSender {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

fn keyboard(buttons: &ButtonRows) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::from_rows(
        buttons
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(label, data)| (label.as_str(), data.clone()))
                    .collect()
            })
            .collect(),
    )
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), WorkflowError> {
        self.client
            .send_message(SendMessageParams::text(chat_id, text))
            .await?;
        Ok(())
    }

    async fn send_text_with_buttons(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &ButtonRows,
    ) -> Result<(), WorkflowError> {
        self.client
            .send_message(SendMessageParams::text(chat_id, text).with_keyboard(keyboard(buttons)))
            .await?;
        Ok(())
    }

    async fn send_file(
        &self,
        chat_id: i64,
        file: &StoredFile,
        caption: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<(), WorkflowError> {
        match file.kind {
            FileKind::Photo => {
                let mut params =
                    SendPhotoParams::by_file_id(chat_id, &file.file_id).with_caption(caption);
                if let Some(buttons) = buttons {
                    params = params.with_keyboard(keyboard(buttons));
                }
                self.client.send_photo(params).await?;
            }
            FileKind::Document => {
                let mut params =
                    SendDocumentParams::by_file_id(chat_id, &file.file_id).with_caption(caption);
                if let Some(buttons) = buttons {
                    params = params.with_keyboard(keyboard(buttons));
                }
                self.client.send_document(params).await?;
            }
        }
        Ok(())
    }
}
