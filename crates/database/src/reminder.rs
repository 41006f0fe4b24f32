//! Payment reminder rows: idempotent creation and the unsent sweep query.

use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{PaymentReminder, Stage};

/// An unsent reminder joined with everything the dispatcher needs to render
/// and deliver it.
#[derive(Debug, Clone, FromRow)]
pub struct UnsentReminder {
    pub id: i64,
    pub schedule_id: i64,
    pub student_id: i64,
    pub days_before: i64,
    pub due_date: NaiveDate,
    pub stage: Stage,
    pub amount: i64,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    /// Student's linked chat, if any.
    pub chat_id: Option<i64>,
    /// Chat of the student's group, only when the group is active and bound.
    pub group_chat_id: Option<i64>,
}

impl UnsentReminder {
    /// Days remaining until the due date (negative when past due).
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

/// Ensure a reminder row exists for the triple. Returns `true` when a new
/// row was created, `false` when the triple already existed.
pub async fn create_if_absent(
    pool: &SqlitePool,
    schedule_id: i64,
    student_id: i64,
    days_before: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO payment_reminders (schedule_id, student_id, days_before)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(schedule_id)
    .bind(student_id)
    .bind(days_before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All unsent reminders for active schedules and active students, joined
/// with schedule and student delivery details.
///
/// Inactive groups contribute no `group_chat_id`, so the dispatcher never
/// posts into a chat the bot has left.
pub async fn list_unsent(pool: &SqlitePool) -> Result<Vec<UnsentReminder>> {
    let reminders = sqlx::query_as::<_, UnsentReminder>(
        r#"
        SELECT r.id, r.schedule_id, r.student_id, r.days_before,
               p.due_date, p.stage, p.amount,
               s.first_name, s.last_name, s.patronymic, s.chat_id,
               g.chat_id AS group_chat_id
        FROM payment_reminders r
        INNER JOIN payment_schedules p ON p.id = r.schedule_id
        INNER JOIN students s ON s.id = r.student_id
        LEFT JOIN groups g ON g.id = s.group_id AND g.is_active = 1
        WHERE r.is_sent = 0 AND p.is_active = 1 AND s.is_active = 1
        ORDER BY r.schedule_id, r.student_id, r.days_before
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

/// Mark a reminder sent with the current timestamp.
pub async fn mark_sent(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE payment_reminders
        SET is_sent = 1, sent_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PaymentReminder",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Get a reminder by primary key.
pub async fn get_reminder(pool: &SqlitePool, id: i64) -> Result<PaymentReminder> {
    sqlx::query_as::<_, PaymentReminder>(
        r#"
        SELECT id, schedule_id, student_id, days_before, is_sent, sent_at
        FROM payment_reminders
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DatabaseError::NotFound {
        entity: "PaymentReminder",
        id: id.to_string(),
    })
}

/// All reminder rows for a schedule (test and reporting helper).
pub async fn list_for_schedule(pool: &SqlitePool, schedule_id: i64) -> Result<Vec<PaymentReminder>> {
    let reminders = sqlx::query_as::<_, PaymentReminder>(
        r#"
        SELECT id, schedule_id, student_id, days_before, is_sent, sent_at
        FROM payment_reminders
        WHERE schedule_id = ?
        ORDER BY student_id, days_before
        "#,
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}
