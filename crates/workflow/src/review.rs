//! Receipt review: approval and rejection.

use database::{receipt, schedule, student, Database, ReceiptStatus};
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::sender::MessageSender;
use crate::texts;

/// Result of a review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// This reviewer's decision was recorded.
    Recorded,
    /// Someone else already reviewed this receipt.
    AlreadyReviewed,
}

/// Applies review decisions and notifies the student.
#[derive(Debug, Clone)]
pub struct ReviewService {
    db: Database,
}

impl ReviewService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Approve a pending receipt.
    pub async fn approve(
        &self,
        receipt_id: i64,
        reviewer: &str,
        sender: &dyn MessageSender,
    ) -> Result<ReviewOutcome, WorkflowError> {
        self.review(receipt_id, ReceiptStatus::Approved, reviewer, "", sender)
            .await
    }

    /// Reject a pending receipt with an optional note for the student.
    pub async fn reject(
        &self,
        receipt_id: i64,
        reviewer: &str,
        notes: &str,
        sender: &dyn MessageSender,
    ) -> Result<ReviewOutcome, WorkflowError> {
        self.review(receipt_id, ReceiptStatus::Rejected, reviewer, notes, sender)
            .await
    }

    async fn review(
        &self,
        receipt_id: i64,
        status: ReceiptStatus,
        reviewer: &str,
        notes: &str,
        sender: &dyn MessageSender,
    ) -> Result<ReviewOutcome, WorkflowError> {
        // The conditional update makes the first decision win; a second
        // reviewer pressing the button a moment later changes nothing.
        let won = receipt::review_transition(self.db.pool(), receipt_id, status, reviewer, notes)
            .await?;
        if !won {
            return Ok(ReviewOutcome::AlreadyReviewed);
        }

        let reviewed = receipt::get_receipt(self.db.pool(), receipt_id).await?;
        let sched = schedule::get_schedule(self.db.pool(), reviewed.schedule_id).await?;
        let reviewed_student = student::get_student(self.db.pool(), reviewed.student_id).await?;

        info!(
            "Receipt {} {} by {}",
            receipt_id,
            status.as_str(),
            reviewer
        );

        if let Some(chat_id) = reviewed_student.chat_id {
            let text = match status {
                ReceiptStatus::Approved => texts::receipt_approved(sched.stage, reviewer),
                ReceiptStatus::Rejected => texts::receipt_rejected(sched.stage, notes),
                ReceiptStatus::Pending => return Ok(ReviewOutcome::Recorded),
            };
            if let Err(e) = sender.send_text(chat_id, &text).await {
                warn!("Failed to notify student chat {}: {}", chat_id, e);
            }
        }

        Ok(ReviewOutcome::Recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::RecordingSender;
    use chrono::NaiveDate;
    use database::{NewStudent, Stage};

    async fn fixture() -> (Database, i64) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        let s = student::create_student(
            db.pool(),
            &NewStudent {
                chat_id: Some(42),
                student_id: "STD1001".to_string(),
                first_name: "Ali".to_string(),
                last_name: "Valiyev".to_string(),
                patronymic: "Vali ogli".to_string(),
                passport_series: "AB".to_string(),
                passport_number: "1234567".to_string(),
                national_id: "12345678901234".to_string(),
                phone: "+998901234567".to_string(),
                group_id: None,
            },
        )
        .await
        .unwrap();
        let sched = schedule::create_schedule(
            db.pool(),
            "2025-2026",
            Stage::Quarter1,
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
            4_500_000,
        )
        .await
        .unwrap();
        let r = receipt::create_receipt(db.pool(), s.id, sched.id, "file-1")
            .await
            .unwrap();
        (db, r.id)
    }

    #[tokio::test]
    async fn test_approve_notifies_student() {
        let (db, receipt_id) = fixture().await;
        let service = ReviewService::new(db.clone());
        let sender = RecordingSender::new();

        let outcome = service.approve(receipt_id, "Buxgalter", &sender).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Recorded);

        let sent = sender.take().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, 42);
        assert!(sent[0].text.contains("tasdiqlandi"));
        assert!(sent[0].text.contains("Buxgalter"));
    }

    #[tokio::test]
    async fn test_second_decision_loses() {
        let (db, receipt_id) = fixture().await;
        let service = ReviewService::new(db.clone());
        let sender = RecordingSender::new();

        service.approve(receipt_id, "Buxgalter", &sender).await.unwrap();
        let second = service.reject(receipt_id, "Admin", "", &sender).await.unwrap();
        assert_eq!(second, ReviewOutcome::AlreadyReviewed);

        // Only one student notification, for the winning decision.
        let sent = sender.take().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("tasdiqlandi"));

        let stored = receipt::get_receipt(db.pool(), receipt_id).await.unwrap();
        assert_eq!(stored.status, ReceiptStatus::Approved);
        assert_eq!(stored.reviewed_by.as_deref(), Some("Buxgalter"));
    }

    #[tokio::test]
    async fn test_reject_includes_notes() {
        let (db, receipt_id) = fixture().await;
        let service = ReviewService::new(db.clone());
        let sender = RecordingSender::new();

        service
            .reject(receipt_id, "Admin", "Chek xira, qayta yuboring", &sender)
            .await
            .unwrap();

        let sent = sender.take().await;
        assert!(sent[0].text.contains("rad etildi"));
        assert!(sent[0].text.contains("Chek xira"));

        let stored = receipt::get_receipt(db.pool(), receipt_id).await.unwrap();
        assert_eq!(stored.notes, "Chek xira, qayta yuboring");
    }
}
