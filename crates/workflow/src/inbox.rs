//! Anonymous questions to the accounting office.

use database::{anonymous, Database};
use tracing::info;

use crate::error::WorkflowError;
use crate::notify::StaffNotifier;
use crate::sender::MessageSender;
use crate::texts;

/// Outcome of a reply attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Delivered,
    AlreadyReplied,
    NotFound,
}

/// Collects free-text questions and routes staff replies back.
///
/// Questions are forwarded to staff without the sender's name; the chat
/// ID is kept only to deliver the eventual reply.
#[derive(Debug, Clone)]
pub struct InboxService {
    db: Database,
    notifier: StaffNotifier,
}

impl InboxService {
    pub fn new(db: Database, notifier: StaffNotifier) -> Self {
        Self { db, notifier }
    }

    /// Record a question and fan it out to staff.
    pub async fn submit_question(
        &self,
        sender_chat_id: i64,
        text: &str,
        sender: &dyn MessageSender,
    ) -> Result<String, WorkflowError> {
        let message = anonymous::create_message(self.db.pool(), sender_chat_id, text).await?;
        info!("Anonymous question {} received", message.id);

        self.notifier
            .broadcast_text(sender, &texts::anonymous_question(message.id, text))
            .await?;

        Ok(texts::ANON_RECEIVED.to_string())
    }

    /// Record a staff reply and deliver it to the asking chat.
    ///
    /// The first reply wins; later attempts report `AlreadyReplied`.
    pub async fn reply(
        &self,
        message_id: i64,
        reply_text: &str,
        staff_name: &str,
        sender: &dyn MessageSender,
    ) -> Result<ReplyOutcome, WorkflowError> {
        let message = match anonymous::get_message(self.db.pool(), message_id).await {
            Ok(m) => m,
            Err(database::DatabaseError::NotFound { .. }) => return Ok(ReplyOutcome::NotFound),
            Err(e) => return Err(e.into()),
        };

        let won =
            anonymous::mark_replied(self.db.pool(), message_id, reply_text, staff_name).await?;
        if !won {
            return Ok(ReplyOutcome::AlreadyReplied);
        }

        sender
            .send_text(message.sender_chat_id, &texts::anonymous_reply(reply_text))
            .await?;
        Ok(ReplyOutcome::Delivered)
    }

    /// Unanswered questions, newest first.
    pub async fn pending(&self) -> Result<Vec<database::AnonymousMessage>, WorkflowError> {
        Ok(anonymous::list_unreplied(self.db.pool()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::RecordingSender;
    use database::{staff, StaffRole};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_question_reaches_staff_and_reply_returns() {
        let db = test_db().await;
        staff::upsert_staff(db.pool(), 900, "Buxgalter", StaffRole::Accountant)
            .await
            .unwrap();

        let inbox = InboxService::new(db.clone(), StaffNotifier::new(db.clone(), vec![]));
        let sender = RecordingSender::new();

        let ack = inbox
            .submit_question(42, "To'lovni bo'lib to'lasam bo'ladimi?", &sender)
            .await
            .unwrap();
        assert_eq!(ack, texts::ANON_RECEIVED);

        let sent = sender.take().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, 900);
        assert!(sent[0].text.contains("/reply_"));
        // The asking chat is never exposed to staff.
        assert!(!sent[0].text.contains("42"));

        let pending = inbox.pending().await.unwrap();
        assert_eq!(pending.len(), 1);

        let outcome = inbox
            .reply(pending[0].id, "Ha, buxgalteriyaga keling.", "Buxgalter", &sender)
            .await
            .unwrap();
        assert_eq!(outcome, ReplyOutcome::Delivered);

        let sent = sender.take().await;
        assert_eq!(sent[0].chat_id, 42);
        assert!(sent[0].text.contains("Ha, buxgalteriyaga keling."));
        assert!(inbox.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_reply_is_refused() {
        let db = test_db().await;
        let inbox = InboxService::new(db.clone(), StaffNotifier::new(db.clone(), vec![]));
        let sender = RecordingSender::new();

        inbox.submit_question(42, "savol", &sender).await.unwrap();
        let id = inbox.pending().await.unwrap()[0].id;

        inbox.reply(id, "birinchi javob", "A", &sender).await.unwrap();
        let second = inbox.reply(id, "ikkinchi javob", "B", &sender).await.unwrap();
        assert_eq!(second, ReplyOutcome::AlreadyReplied);

        assert_eq!(inbox.reply(999, "javob", "A", &sender).await.unwrap(), ReplyOutcome::NotFound);
    }
}
