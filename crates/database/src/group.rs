//! Group CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Group;

const SELECT: &str = r#"
    SELECT id, name, chat_id, chat_title, is_active, created_at
    FROM groups
"#;

/// Get a group by primary key.
pub async fn get_group(pool: &SqlitePool, id: i64) -> Result<Group> {
    sqlx::query_as::<_, Group>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "Group",
            id: id.to_string(),
        })
}

/// Get a group by its bound chat.
pub async fn get_by_chat_id(pool: &SqlitePool, chat_id: i64) -> Result<Option<Group>> {
    let group = sqlx::query_as::<_, Group>(&format!("{SELECT} WHERE chat_id = ?"))
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;

    Ok(group)
}

/// Register or reactivate a chat binding.
///
/// Called when the bot is added to a chat: an existing binding is
/// reactivated with a fresh title, a new chat gets a new group row named
/// after the chat.
pub async fn upsert_chat_binding(pool: &SqlitePool, chat_id: i64, title: &str) -> Result<Group> {
    sqlx::query(
        r#"
        INSERT INTO groups (name, chat_id, chat_title, is_active)
        VALUES (?2, ?1, ?2, 1)
        ON CONFLICT(chat_id) DO UPDATE SET
            chat_title = excluded.chat_title,
            is_active = 1
        "#,
    )
    .bind(chat_id)
    .bind(title)
    .execute(pool)
    .await?;

    get_by_chat_id(pool, chat_id)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "Group",
            id: chat_id.to_string(),
        })
}

/// Deactivate the group bound to a chat (bot removed). Missing binding is a
/// no-op.
pub async fn deactivate_by_chat(pool: &SqlitePool, chat_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE groups SET is_active = 0 WHERE chat_id = ?")
        .bind(chat_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All groups, ordered by name.
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    let groups = sqlx::query_as::<_, Group>(&format!("{SELECT} ORDER BY name"))
        .fetch_all(pool)
        .await?;

    Ok(groups)
}

/// Count active groups.
pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups WHERE is_active = 1")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
