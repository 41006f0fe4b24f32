//! Receipt CRUD and the conditional review transition.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Receipt, ReceiptStatus, Stage};

const SELECT: &str = r#"
    SELECT id, student_id, schedule_id, file_id, status, submitted_at,
           reviewed_by, reviewed_at, notes
    FROM receipts
"#;

/// Create a pending receipt. Unique on (student_id, schedule_id).
pub async fn create_receipt(
    pool: &SqlitePool,
    student_id: i64,
    schedule_id: i64,
    file_id: &str,
) -> Result<Receipt> {
    let id = sqlx::query(
        r#"
        INSERT INTO receipts (student_id, schedule_id, file_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(schedule_id)
    .bind(file_id)
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::on_conflict(e, "Receipt", format!("{}/{}", student_id, schedule_id))
    })?
    .last_insert_rowid();

    get_receipt(pool, id).await
}

/// Get a receipt by primary key.
pub async fn get_receipt(pool: &SqlitePool, id: i64) -> Result<Receipt> {
    sqlx::query_as::<_, Receipt>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "Receipt",
            id: id.to_string(),
        })
}

/// The receipt for a (student, schedule) pair, if one was ever submitted.
pub async fn find_by_pair(
    pool: &SqlitePool,
    student_id: i64,
    schedule_id: i64,
) -> Result<Option<Receipt>> {
    let receipt = sqlx::query_as::<_, Receipt>(&format!(
        "{SELECT} WHERE student_id = ? AND schedule_id = ?"
    ))
    .bind(student_id)
    .bind(schedule_id)
    .fetch_optional(pool)
    .await?;

    Ok(receipt)
}

/// Transition a pending receipt to approved or rejected.
///
/// The update is conditional on the current status still being `pending`,
/// so two concurrent reviews cannot both win. Returns `false` when the
/// receipt was missing or already reviewed.
pub async fn review_transition(
    pool: &SqlitePool,
    id: i64,
    status: ReceiptStatus,
    reviewer: &str,
    notes: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE receipts
        SET status = ?, reviewed_by = ?, reviewed_at = datetime('now'), notes = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(status)
    .bind(reviewer)
    .bind(notes)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the file of a rejected receipt and put it back in review.
///
/// Returns false if the receipt is not currently rejected.
pub async fn resubmit(pool: &SqlitePool, id: i64, file_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE receipts
        SET file_id = ?, status = 'pending', notes = '',
            reviewed_by = NULL, reviewed_at = NULL,
            submitted_at = datetime('now')
        WHERE id = ? AND status = 'rejected'
        "#,
    )
    .bind(file_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// A student's receipts, newest first.
pub async fn list_for_student(pool: &SqlitePool, student_id: i64) -> Result<Vec<Receipt>> {
    let receipts = sqlx::query_as::<_, Receipt>(&format!(
        "{SELECT} WHERE student_id = ? ORDER BY submitted_at DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(receipts)
}

/// Receipts filtered by status and/or schedule stage, newest first.
pub async fn list_filtered(
    pool: &SqlitePool,
    status: Option<ReceiptStatus>,
    stage: Option<Stage>,
) -> Result<Vec<Receipt>> {
    let receipts = sqlx::query_as::<_, Receipt>(
        r#"
        SELECT r.id, r.student_id, r.schedule_id, r.file_id, r.status,
               r.submitted_at, r.reviewed_by, r.reviewed_at, r.notes
        FROM receipts r
        INNER JOIN payment_schedules s ON s.id = r.schedule_id
        WHERE (?1 IS NULL OR r.status = ?1)
          AND (?2 IS NULL OR s.stage = ?2)
        ORDER BY r.submitted_at DESC, r.id DESC
        "#,
    )
    .bind(status)
    .bind(stage)
    .fetch_all(pool)
    .await?;

    Ok(receipts)
}

/// Count receipts with the given status.
pub async fn count_by_status(pool: &SqlitePool, status: ReceiptStatus) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM receipts WHERE status = ?")
        .bind(status)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Count all receipts for a schedule.
pub async fn count_for_schedule(pool: &SqlitePool, schedule_id: i64) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM receipts WHERE schedule_id = ?")
            .bind(schedule_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Count receipts for a schedule with the given status.
pub async fn count_for_schedule_by_status(
    pool: &SqlitePool,
    schedule_id: i64,
    status: ReceiptStatus,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM receipts WHERE schedule_id = ? AND status = ?",
    )
    .bind(schedule_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
