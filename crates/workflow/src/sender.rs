//! Message sender trait and implementations.

use async_trait::async_trait;

use crate::error::WorkflowError;

/// Kind of a stored Telegram file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Photo,
    Document,
}

/// A file previously uploaded to Telegram, addressable by file_id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_id: String,
    pub kind: FileKind,
}

impl StoredFile {
    pub fn photo(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            kind: FileKind::Photo,
        }
    }

    pub fn document(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            kind: FileKind::Document,
        }
    }
}

/// Inline keyboard rows as (label, callback data) pairs.
pub type ButtonRows = Vec<Vec<(String, String)>>;

/// Trait for delivering messages to chats.
///
/// Abstracted to support different transports (Telegram, tests, etc.)
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), WorkflowError>;

    /// Send a text message with an inline keyboard.
    ///
    /// Default implementation ignores the buttons and calls `send_text`.
    async fn send_text_with_buttons(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &ButtonRows,
    ) -> Result<(), WorkflowError> {
        let _ = buttons;
        self.send_text(chat_id, text).await
    }

    /// Re-send a stored file with a caption and an optional inline keyboard.
    async fn send_file(
        &self,
        chat_id: i64,
        file: &StoredFile,
        caption: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<(), WorkflowError>;
}

/// A no-op sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl MessageSender for NoOpSender {
    async fn send_text(&self, _chat_id: i64, _text: &str) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn send_file(
        &self,
        _chat_id: i64,
        _file: &StoredFile,
        _caption: &str,
        _buttons: Option<&ButtonRows>,
    ) -> Result<(), WorkflowError> {
        Ok(())
    }
}

/// A logging sender for debugging that logs all operations.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl MessageSender for LoggingSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), WorkflowError> {
        tracing::info!("Sending to {}: {}", chat_id, text);
        Ok(())
    }

    async fn send_file(
        &self,
        chat_id: i64,
        file: &StoredFile,
        caption: &str,
        _buttons: Option<&ButtonRows>,
    ) -> Result<(), WorkflowError> {
        tracing::info!(
            "Sending {:?} {} to {}: {}",
            file.kind,
            file.file_id,
            chat_id,
            caption
        );
        Ok(())
    }
}

/// An outgoing message captured by [`RecordingSender`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub file: Option<StoredFile>,
    pub buttons: ButtonRows,
}

/// A sender that records everything it is asked to deliver.
///
/// Used by tests to assert on delivered messages.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: tokio::sync::Mutex<Vec<SentMessage>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded messages, clearing the record.
    pub async fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.lock().await)
    }

    /// Number of recorded messages.
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), WorkflowError> {
        self.sent.lock().await.push(SentMessage {
            chat_id,
            text: text.to_string(),
            file: None,
            buttons: Vec::new(),
        });
        Ok(())
    }

    async fn send_text_with_buttons(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &ButtonRows,
    ) -> Result<(), WorkflowError> {
        self.sent.lock().await.push(SentMessage {
            chat_id,
            text: text.to_string(),
            file: None,
            buttons: buttons.clone(),
        });
        Ok(())
    }

    async fn send_file(
        &self,
        chat_id: i64,
        file: &StoredFile,
        caption: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<(), WorkflowError> {
        self.sent.lock().await.push(SentMessage {
            chat_id,
            text: caption.to_string(),
            file: Some(file.clone()),
            buttons: buttons.cloned().unwrap_or_default(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sender() {
        let sender = NoOpSender;
        sender.send_text(1, "test").await.unwrap();
        sender
            .send_file(1, &StoredFile::photo("f"), "caption", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recording_sender() {
        let sender = RecordingSender::new();
        sender.send_text(1, "hello").await.unwrap();
        sender
            .send_file(2, &StoredFile::document("f1"), "chek", None)
            .await
            .unwrap();

        let sent = sender.take().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].chat_id, 1);
        assert_eq!(sent[1].file.as_ref().unwrap().kind, FileKind::Document);
        assert_eq!(sender.count().await, 0);
    }
}
