//! Anonymous messages to the accounting office.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::AnonymousMessage;

const SELECT: &str = r#"
    SELECT id, sender_chat_id, message_text, reply_text, replied_by,
           replied_at, is_replied, created_at
    FROM anonymous_messages
"#;

/// Record an anonymous question from a student.
pub async fn create_message(
    pool: &SqlitePool,
    sender_chat_id: i64,
    message_text: &str,
) -> Result<AnonymousMessage> {
    let id = sqlx::query(
        r#"
        INSERT INTO anonymous_messages (sender_chat_id, message_text)
        VALUES (?, ?)
        "#,
    )
    .bind(sender_chat_id)
    .bind(message_text)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_message(pool, id).await
}

/// Get a message by primary key.
pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<AnonymousMessage> {
    sqlx::query_as::<_, AnonymousMessage>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "AnonymousMessage",
            id: id.to_string(),
        })
}

/// Unreplied messages, newest first.
pub async fn list_unreplied(pool: &SqlitePool) -> Result<Vec<AnonymousMessage>> {
    let messages = sqlx::query_as::<_, AnonymousMessage>(&format!(
        "{SELECT} WHERE is_replied = 0 ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Store a staff reply. Conditional on the message still being unreplied;
/// returns `false` when it was already answered.
pub async fn mark_replied(
    pool: &SqlitePool,
    id: i64,
    reply_text: &str,
    replied_by: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE anonymous_messages
        SET reply_text = ?, replied_by = ?, replied_at = datetime('now'), is_replied = 1
        WHERE id = ? AND is_replied = 0
        "#,
    )
    .bind(reply_text)
    .bind(replied_by)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
