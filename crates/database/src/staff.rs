//! Staff account storage for review notifications and authorization.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{StaffAccount, StaffRole};

const SELECT: &str = r#"
    SELECT id, chat_id, full_name, role, is_active, created_at
    FROM staff_accounts
"#;

/// Register a staff account or update an existing chat binding's name/role.
pub async fn upsert_staff(
    pool: &SqlitePool,
    chat_id: i64,
    full_name: &str,
    role: StaffRole,
) -> Result<StaffAccount> {
    sqlx::query(
        r#"
        INSERT INTO staff_accounts (chat_id, full_name, role, is_active)
        VALUES (?, ?, ?, 1)
        ON CONFLICT(chat_id) DO UPDATE SET
            full_name = excluded.full_name,
            role = excluded.role,
            is_active = 1
        "#,
    )
    .bind(chat_id)
    .bind(full_name)
    .bind(role)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, StaffAccount>(&format!("{SELECT} WHERE chat_id = ?"))
        .bind(chat_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "StaffAccount",
            id: chat_id.to_string(),
        })
}

/// The active staff role bound to a chat, if any.
pub async fn role_for_chat(pool: &SqlitePool, chat_id: i64) -> Result<Option<StaffRole>> {
    let role = sqlx::query_scalar::<_, StaffRole>(
        "SELECT role FROM staff_accounts WHERE chat_id = ? AND is_active = 1",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

/// Active staff accounts with a linked chat, the receipt-notification
/// fan-out set.
pub async fn list_notifiable(pool: &SqlitePool) -> Result<Vec<StaffAccount>> {
    let staff = sqlx::query_as::<_, StaffAccount>(&format!(
        "{SELECT} WHERE is_active = 1 AND chat_id IS NOT NULL ORDER BY full_name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(staff)
}

