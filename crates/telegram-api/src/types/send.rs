//! Outgoing request payloads for the Bot API.

use serde::Serialize;

/// Parameters for the sendMessage method.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageParams {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendMessageParams {
    /// Plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
        }
    }

    /// Attach an inline keyboard.
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Parameters for the sendDocument method (re-sending by file_id).
#[derive(Debug, Clone, Serialize)]
pub struct SendDocumentParams {
    pub chat_id: i64,
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendDocumentParams {
    /// Forward a previously uploaded file by its file_id.
    pub fn by_file_id(chat_id: i64, file_id: impl Into<String>) -> Self {
        Self {
            chat_id,
            document: file_id.into(),
            caption: None,
            reply_markup: None,
        }
    }

    /// Attach a caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Attach an inline keyboard.
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Parameters for the sendPhoto method (re-sending by file_id).
#[derive(Debug, Clone, Serialize)]
pub struct SendPhotoParams {
    pub chat_id: i64,
    pub photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendPhotoParams {
    /// Forward a previously uploaded photo by its file_id.
    pub fn by_file_id(chat_id: i64, file_id: impl Into<String>) -> Self {
        Self {
            chat_id,
            photo: file_id.into(),
            caption: None,
            reply_markup: None,
        }
    }

    /// Attach a caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Attach an inline keyboard.
    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

/// Parameters for answerCallbackQuery.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackParams {
    pub callback_query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// An inline keyboard attached to a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Build a keyboard from rows of (label, callback_data) pairs.
    pub fn from_rows(rows: Vec<Vec<(&str, String)>>) -> Self {
        Self {
            inline_keyboard: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(text, data)| InlineKeyboardButton {
                            text: text.to_string(),
                            callback_data: data,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

/// A single inline keyboard button.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_params_skip_none_markup() {
        let params = SendMessageParams::text(1, "salom");
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("reply_markup").is_none());
    }

    #[test]
    fn test_keyboard_from_rows() {
        let kb = InlineKeyboardMarkup::from_rows(vec![vec![
            ("Tasdiqlash", "approve_receipt_7".to_string()),
            ("Rad etish", "reject_receipt_7".to_string()),
        ]]);
        assert_eq!(kb.inline_keyboard.len(), 1);
        assert_eq!(kb.inline_keyboard[0][1].callback_data, "reject_receipt_7");
    }

    #[test]
    fn test_document_builder() {
        let params = SendDocumentParams::by_file_id(5, "file-abc").with_caption("chek");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["document"], "file-abc");
        assert_eq!(json["caption"], "chek");
    }
}
