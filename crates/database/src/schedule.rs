//! Payment schedule CRUD operations.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{PaymentSchedule, Stage};

const SELECT: &str = r#"
    SELECT id, academic_year, stage, due_date, amount, is_active, created_at
    FROM payment_schedules
"#;

/// Create a schedule. Unique on (academic_year, stage).
pub async fn create_schedule(
    pool: &SqlitePool,
    academic_year: &str,
    stage: Stage,
    due_date: NaiveDate,
    amount: i64,
) -> Result<PaymentSchedule> {
    let id = sqlx::query(
        r#"
        INSERT INTO payment_schedules (academic_year, stage, due_date, amount)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(academic_year)
    .bind(stage)
    .bind(due_date)
    .bind(amount)
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::on_conflict(e, "PaymentSchedule", format!("{}/{}", academic_year, stage))
    })?
    .last_insert_rowid();

    get_schedule(pool, id).await
}

/// Get a schedule by primary key.
pub async fn get_schedule(pool: &SqlitePool, id: i64) -> Result<PaymentSchedule> {
    sqlx::query_as::<_, PaymentSchedule>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "PaymentSchedule",
            id: id.to_string(),
        })
}

/// The active schedule for a stage, if any.
///
/// The submission workflow aborts stage selection when this is `None`.
pub async fn active_for_stage(pool: &SqlitePool, stage: Stage) -> Result<Option<PaymentSchedule>> {
    let schedule = sqlx::query_as::<_, PaymentSchedule>(&format!(
        "{SELECT} WHERE stage = ? AND is_active = 1 ORDER BY due_date LIMIT 1"
    ))
    .bind(stage)
    .fetch_optional(pool)
    .await?;

    Ok(schedule)
}

/// All schedules, newest academic year first.
pub async fn list_schedules(pool: &SqlitePool) -> Result<Vec<PaymentSchedule>> {
    let schedules = sqlx::query_as::<_, PaymentSchedule>(&format!(
        "{SELECT} ORDER BY academic_year DESC, stage"
    ))
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

/// Active schedules ordered by due date.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<PaymentSchedule>> {
    let schedules = sqlx::query_as::<_, PaymentSchedule>(&format!(
        "{SELECT} WHERE is_active = 1 ORDER BY due_date"
    ))
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

/// Active schedules with a due date in `[from, to]`, ordered by due date.
pub async fn list_between(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<PaymentSchedule>> {
    let schedules = sqlx::query_as::<_, PaymentSchedule>(&format!(
        "{SELECT} WHERE is_active = 1 AND due_date >= ? AND due_date <= ? ORDER BY due_date"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}

/// Active schedules already past due, ordered by due date.
pub async fn list_overdue(pool: &SqlitePool, today: NaiveDate) -> Result<Vec<PaymentSchedule>> {
    let schedules = sqlx::query_as::<_, PaymentSchedule>(&format!(
        "{SELECT} WHERE is_active = 1 AND due_date < ? ORDER BY due_date"
    ))
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(schedules)
}
