//! Staff notification fan-out.

use std::collections::BTreeSet;

use database::{staff, Database};
use tracing::warn;

use crate::error::WorkflowError;
use crate::sender::{ButtonRows, MessageSender, StoredFile};

/// Delivers a message to every reachable staff member.
///
/// Recipients are the active staff accounts with a bound chat plus the
/// chat IDs from the `ADMIN_IDS` allow-list, deduplicated. A failed
/// delivery to one recipient never aborts the rest.
#[derive(Debug, Clone)]
pub struct StaffNotifier {
    db: Database,
    admin_ids: Vec<i64>,
}

impl StaffNotifier {
    pub fn new(db: Database, admin_ids: Vec<i64>) -> Self {
        Self { db, admin_ids }
    }

    /// All distinct staff chat IDs.
    pub async fn recipient_chats(&self) -> Result<Vec<i64>, WorkflowError> {
        let mut chats: BTreeSet<i64> = self.admin_ids.iter().copied().collect();
        for account in staff::list_notifiable(self.db.pool()).await? {
            if let Some(chat_id) = account.chat_id {
                chats.insert(chat_id);
            }
        }
        Ok(chats.into_iter().collect())
    }

    /// Send a text message to all staff chats. Returns the delivered count.
    pub async fn broadcast_text(
        &self,
        sender: &dyn MessageSender,
        text: &str,
    ) -> Result<u64, WorkflowError> {
        let mut delivered = 0;
        for chat_id in self.recipient_chats().await? {
            match sender.send_text(chat_id, text).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to notify staff chat {}: {}", chat_id, e),
            }
        }
        Ok(delivered)
    }

    /// Send a file to all staff chats. Returns the delivered count.
    pub async fn broadcast_file(
        &self,
        sender: &dyn MessageSender,
        file: &StoredFile,
        caption: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<u64, WorkflowError> {
        let mut delivered = 0;
        for chat_id in self.recipient_chats().await? {
            match sender.send_file(chat_id, file, caption, buttons).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to notify staff chat {}: {}", chat_id, e),
            }
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::RecordingSender;
    use database::StaffRole;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_recipients_deduplicated() {
        let db = test_db().await;
        staff::upsert_staff(db.pool(), 100, "Admin", StaffRole::Admin).await.unwrap();
        staff::upsert_staff(db.pool(), 200, "Buxgalter", StaffRole::Accountant)
            .await
            .unwrap();

        // 100 appears both as a staff account and in the allow-list.
        let notifier = StaffNotifier::new(db.clone(), vec![100, 300]);
        assert_eq!(notifier.recipient_chats().await.unwrap(), vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_broadcast_text() {
        let db = test_db().await;
        staff::upsert_staff(db.pool(), 100, "Admin", StaffRole::Admin).await.unwrap();

        let notifier = StaffNotifier::new(db.clone(), vec![300]);
        let sender = RecordingSender::new();
        let delivered = notifier.broadcast_text(&sender, "yangi xabar").await.unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(sender.count().await, 2);
    }
}
