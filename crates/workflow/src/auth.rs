//! Staff authorization.

use database::{staff, Database, StaffRole};

use crate::error::WorkflowError;

/// Resolves who is allowed to review receipts and manage data.
///
/// A chat is staff if it is on the `ADMIN_IDS` allow-list (always admin)
/// or has an active staff account in the database.
#[derive(Debug, Clone)]
pub struct AuthContext {
    db: Database,
    admin_ids: Vec<i64>,
}

impl AuthContext {
    pub fn new(db: Database, admin_ids: Vec<i64>) -> Self {
        Self { db, admin_ids }
    }

    /// The staff role of a chat, if any.
    pub async fn role_for(&self, chat_id: i64) -> Result<Option<StaffRole>, WorkflowError> {
        if self.admin_ids.contains(&chat_id) {
            return Ok(Some(StaffRole::Admin));
        }
        Ok(staff::role_for_chat(self.db.pool(), chat_id).await?)
    }

    /// Whether a chat may review receipts (any staff role).
    pub async fn can_review(&self, chat_id: i64) -> Result<bool, WorkflowError> {
        Ok(self.role_for(chat_id).await?.is_some())
    }

    /// Require staff access, erroring otherwise.
    pub async fn require_staff(&self, chat_id: i64) -> Result<StaffRole, WorkflowError> {
        self.role_for(chat_id)
            .await?
            .ok_or(WorkflowError::NotAuthorized)
    }

    /// Require the admin role specifically.
    pub async fn require_admin(&self, chat_id: i64) -> Result<(), WorkflowError> {
        match self.role_for(chat_id).await? {
            Some(StaffRole::Admin) => Ok(()),
            _ => Err(WorkflowError::NotAuthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_env_allow_list_is_admin() {
        let db = test_db().await;
        let auth = AuthContext::new(db, vec![500]);

        assert_eq!(auth.role_for(500).await.unwrap(), Some(StaffRole::Admin));
        auth.require_admin(500).await.unwrap();
        assert_eq!(auth.role_for(501).await.unwrap(), None);
        assert!(matches!(
            auth.require_staff(501).await,
            Err(WorkflowError::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_accountant_can_review_but_not_admin() {
        let db = test_db().await;
        staff::upsert_staff(db.pool(), 200, "Buxgalter", StaffRole::Accountant)
            .await
            .unwrap();
        let auth = AuthContext::new(db, vec![]);

        assert!(auth.can_review(200).await.unwrap());
        assert_eq!(auth.require_staff(200).await.unwrap(), StaffRole::Accountant);
        assert!(matches!(
            auth.require_admin(200).await,
            Err(WorkflowError::NotAuthorized)
        ));
    }
}
