//! Student CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Student;

/// Fields for creating a new student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub chat_id: Option<i64>,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub passport_series: String,
    pub passport_number: String,
    pub national_id: String,
    pub phone: String,
    pub group_id: Option<i64>,
}

const SELECT: &str = r#"
    SELECT id, chat_id, student_id, first_name, last_name, patronymic,
           passport_series, passport_number, national_id, phone,
           group_id, is_active, created_at
    FROM students
"#;

/// Create a student. Unique on (student_id) and (national_id).
pub async fn create_student(pool: &SqlitePool, new: &NewStudent) -> Result<Student> {
    let id = sqlx::query(
        r#"
        INSERT INTO students (chat_id, student_id, first_name, last_name, patronymic,
                              passport_series, passport_number, national_id, phone, group_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.chat_id)
    .bind(&new.student_id)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.patronymic)
    .bind(&new.passport_series)
    .bind(&new.passport_number)
    .bind(&new.national_id)
    .bind(&new.phone)
    .bind(new.group_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_conflict(e, "Student", new.student_id.clone()))?
    .last_insert_rowid();

    get_student(pool, id).await
}

/// Get a student by primary key.
pub async fn get_student(pool: &SqlitePool, id: i64) -> Result<Student> {
    sqlx::query_as::<_, Student>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound {
            entity: "Student",
            id: id.to_string(),
        })
}

/// Look up a student by the institute's external id.
pub async fn get_by_external_id(pool: &SqlitePool, student_id: &str) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(&format!("{SELECT} WHERE student_id = ?"))
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

    Ok(student)
}

/// Look up a student by their linked messaging identity.
pub async fn get_by_chat_id(pool: &SqlitePool, chat_id: i64) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(&format!("{SELECT} WHERE chat_id = ?"))
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;

    Ok(student)
}

/// All active students, ordered by last name.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Student>> {
    let students = sqlx::query_as::<_, Student>(&format!(
        "{SELECT} WHERE is_active = 1 ORDER BY last_name, first_name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// List students, optionally filtered by a substring of id, name or
/// national id.
pub async fn list_students(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Student>> {
    let students = match search {
        Some(term) if !term.is_empty() => {
            let pattern = format!("%{}%", term);
            sqlx::query_as::<_, Student>(&format!(
                "{SELECT} WHERE student_id LIKE ?1 OR first_name LIKE ?1
                          OR last_name LIKE ?1 OR national_id LIKE ?1
                 ORDER BY last_name, first_name"
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        _ => {
            sqlx::query_as::<_, Student>(&format!("{SELECT} ORDER BY last_name, first_name"))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(students)
}

/// Bind a messaging identity to an existing student.
pub async fn bind_chat_id(pool: &SqlitePool, id: i64, chat_id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE students SET chat_id = ? WHERE id = ?")
        .bind(chat_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Student",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Assign a student to a group (or detach with None).
pub async fn assign_group(pool: &SqlitePool, id: i64, group_id: Option<i64>) -> Result<()> {
    let result = sqlx::query("UPDATE students SET group_id = ? WHERE id = ?")
        .bind(group_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Student",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Deactivate a student. Students are never hard-deleted.
pub async fn deactivate_student(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE students SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Student",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count active students.
pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE is_active = 1")
            .fetch_one(pool)
            .await?;

    Ok(count)
}
