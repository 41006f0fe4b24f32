//! SQLite persistence layer for the payment-tracking bot.
//!
//! This crate provides async database operations for students, groups,
//! payment schedules, receipts, reminders and templates using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::Stage, schedule};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:paytrack.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let due = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
//!     schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, due, 4_500_000)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod anonymous;
pub mod error;
pub mod group;
pub mod models;
pub mod receipt;
pub mod reminder;
pub mod schedule;
pub mod staff;
pub mod student;
pub mod template;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    AnonymousMessage, Group, PaymentReminder, PaymentSchedule, Receipt, ReceiptStatus,
    ReminderTemplate, StaffAccount, StaffRole, Stage, Student,
};
pub use reminder::UnsentReminder;
pub use student::NewStudent;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn sample_student(external_id: &str, national_id: &str) -> NewStudent {
        NewStudent {
            chat_id: None,
            student_id: external_id.to_string(),
            first_name: "Ali".to_string(),
            last_name: "Valiyev".to_string(),
            patronymic: "Vali ogli".to_string(),
            passport_series: "AB".to_string(),
            passport_number: "1234567".to_string(),
            national_id: national_id.to_string(),
            phone: "+998901234567".to_string(),
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_student_crud() {
        let db = test_db().await;

        let created = student::create_student(db.pool(), &sample_student("STD1001", "12345678901234"))
            .await
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.student_id, "STD1001");

        let fetched = student::get_by_external_id(db.pool(), "STD1001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, created.id);

        student::bind_chat_id(db.pool(), created.id, 777).await.unwrap();
        let bound = student::get_by_chat_id(db.pool(), 777).await.unwrap().unwrap();
        assert_eq!(bound.id, created.id);

        assert_eq!(student::count_active(db.pool()).await.unwrap(), 1);

        student::deactivate_student(db.pool(), created.id).await.unwrap();
        assert_eq!(student::count_active(db.pool()).await.unwrap(), 0);
        // Deactivated, not deleted.
        assert!(student::get_student(db.pool(), created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_student_unique_external_id() {
        let db = test_db().await;

        student::create_student(db.pool(), &sample_student("STD1001", "12345678901234"))
            .await
            .unwrap();
        let result =
            student::create_student(db.pool(), &sample_student("STD1001", "99999999999999")).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_schedule_unique_year_stage() {
        let db = test_db().await;
        let due = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();

        schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, due, 1_000_000)
            .await
            .unwrap();
        let dup =
            schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, due, 2_000_000)
                .await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));

        // Same stage in another year is fine.
        schedule::create_schedule(db.pool(), "2026-2027", Stage::Quarter1, due, 1_000_000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_receipt_unique_pair_and_review() {
        let db = test_db().await;
        let due = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();

        let s = student::create_student(db.pool(), &sample_student("STD1001", "12345678901234"))
            .await
            .unwrap();
        let sched =
            schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, due, 1_000_000)
                .await
                .unwrap();

        let receipt = receipt::create_receipt(db.pool(), s.id, sched.id, "file-1")
            .await
            .unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Pending);

        let dup = receipt::create_receipt(db.pool(), s.id, sched.id, "file-2").await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));

        // First review wins.
        let ok = receipt::review_transition(
            db.pool(),
            receipt.id,
            ReceiptStatus::Approved,
            "accountant",
            "",
        )
        .await
        .unwrap();
        assert!(ok);

        // Second review is rejected by the conditional update.
        let again = receipt::review_transition(
            db.pool(),
            receipt.id,
            ReceiptStatus::Rejected,
            "admin",
            "",
        )
        .await
        .unwrap();
        assert!(!again);

        let reviewed = receipt::get_receipt(db.pool(), receipt.id).await.unwrap();
        assert_eq!(reviewed.status, ReceiptStatus::Approved);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("accountant"));
        assert!(reviewed.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_reminder_create_if_absent() {
        let db = test_db().await;
        let due = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();

        let s = student::create_student(db.pool(), &sample_student("STD1001", "12345678901234"))
            .await
            .unwrap();
        let sched =
            schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, due, 1_000_000)
                .await
                .unwrap();

        assert!(reminder::create_if_absent(db.pool(), sched.id, s.id, 7).await.unwrap());
        // Existing triple is a no-op, not an error.
        assert!(!reminder::create_if_absent(db.pool(), sched.id, s.id, 7).await.unwrap());

        let rows = reminder::list_for_schedule(db.pool(), sched.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_sent);

        reminder::mark_sent(db.pool(), rows[0].id).await.unwrap();
        let sent = reminder::get_reminder(db.pool(), rows[0].id).await.unwrap();
        assert!(sent.is_sent);
        assert!(sent.sent_at.is_some());
    }

    #[tokio::test]
    async fn test_group_binding_lifecycle() {
        let db = test_db().await;

        let group = group::upsert_chat_binding(db.pool(), -100123, "201-guruh").await.unwrap();
        assert!(group.is_active);
        assert_eq!(group.chat_id, Some(-100123));

        assert!(group::deactivate_by_chat(db.pool(), -100123).await.unwrap());
        let inactive = group::get_by_chat_id(db.pool(), -100123).await.unwrap().unwrap();
        assert!(!inactive.is_active);

        // Re-adding the bot reactivates the same row.
        let again = group::upsert_chat_binding(db.pool(), -100123, "201-guruh").await.unwrap();
        assert_eq!(again.id, group.id);
        assert!(again.is_active);

        // Unknown chat deactivation is a no-op.
        assert!(!group::deactivate_by_chat(db.pool(), -1).await.unwrap());
    }

    #[tokio::test]
    async fn test_template_upsert_and_lookup() {
        let db = test_db().await;

        template::upsert_template(db.pool(), 7, "{student_name}: {days} kun qoldi", true)
            .await
            .unwrap();
        let t = template::get_active_for_offset(db.pool(), 7).await.unwrap().unwrap();
        assert!(t.message_text.contains("{days}"));

        // Deactivated templates are invisible to the dispatcher.
        template::upsert_template(db.pool(), 7, "yangi matn", false).await.unwrap();
        assert!(template::get_active_for_offset(db.pool(), 7).await.unwrap().is_none());

        assert!(template::get_active_for_offset(db.pool(), 30).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_staff_roles() {
        let db = test_db().await;

        staff::upsert_staff(db.pool(), 100, "Admin One", StaffRole::Admin).await.unwrap();
        staff::upsert_staff(db.pool(), 200, "Buxgalter", StaffRole::Accountant)
            .await
            .unwrap();

        assert_eq!(
            staff::role_for_chat(db.pool(), 100).await.unwrap(),
            Some(StaffRole::Admin)
        );
        assert_eq!(staff::role_for_chat(db.pool(), 999).await.unwrap(), None);

        assert_eq!(staff::list_notifiable(db.pool()).await.unwrap().len(), 2);

        // Re-upserting the same chat updates in place.
        staff::upsert_staff(db.pool(), 200, "Bosh buxgalter", StaffRole::Admin).await.unwrap();
        assert_eq!(
            staff::role_for_chat(db.pool(), 200).await.unwrap(),
            Some(StaffRole::Admin)
        );
        assert_eq!(staff::list_notifiable(db.pool()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_reply_once() {
        let db = test_db().await;

        let msg = anonymous::create_message(db.pool(), 555, "To'lovni bo'lib to'lasam bo'ladimi?")
            .await
            .unwrap();
        assert!(!msg.is_replied);
        assert_eq!(anonymous::list_unreplied(db.pool()).await.unwrap().len(), 1);

        assert!(anonymous::mark_replied(db.pool(), msg.id, "Ha, buxgalteriyaga keling.", "Buxgalter")
            .await
            .unwrap());
        // Second reply attempt loses.
        assert!(!anonymous::mark_replied(db.pool(), msg.id, "boshqa javob", "Admin")
            .await
            .unwrap());

        assert!(anonymous::list_unreplied(db.pool()).await.unwrap().is_empty());
    }
}
