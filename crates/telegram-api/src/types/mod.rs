//! Request and response types for the Bot API.

pub mod send;
pub mod update;

pub use send::{
    AnswerCallbackParams, InlineKeyboardButton, InlineKeyboardMarkup, SendDocumentParams,
    SendMessageParams, SendPhotoParams,
};
pub use update::{
    CallbackQuery, Chat, ChatKind, ChatMember, ChatMemberUpdated, Document, MemberStatus, Message,
    PhotoSize, Update, User,
};
