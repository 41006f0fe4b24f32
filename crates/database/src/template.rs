//! Reminder template storage.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ReminderTemplate;

/// The active template for an offset, if one is configured.
pub async fn get_active_for_offset(
    pool: &SqlitePool,
    days_before: i64,
) -> Result<Option<ReminderTemplate>> {
    let template = sqlx::query_as::<_, ReminderTemplate>(
        r#"
        SELECT days_before, message_text, is_active
        FROM reminder_templates
        WHERE days_before = ? AND is_active = 1
        "#,
    )
    .bind(days_before)
    .fetch_optional(pool)
    .await?;

    Ok(template)
}

/// Create or replace the template for an offset.
pub async fn upsert_template(
    pool: &SqlitePool,
    days_before: i64,
    message_text: &str,
    is_active: bool,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reminder_templates (days_before, message_text, is_active)
        VALUES (?, ?, ?)
        ON CONFLICT(days_before) DO UPDATE SET
            message_text = excluded.message_text,
            is_active = excluded.is_active
        "#,
    )
    .bind(days_before)
    .bind(message_text)
    .bind(is_active)
    .execute(pool)
    .await?;

    Ok(())
}

/// All templates ordered by offset, largest first.
pub async fn list_templates(pool: &SqlitePool) -> Result<Vec<ReminderTemplate>> {
    let templates = sqlx::query_as::<_, ReminderTemplate>(
        r#"
        SELECT days_before, message_text, is_active
        FROM reminder_templates
        ORDER BY days_before DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(templates)
}
