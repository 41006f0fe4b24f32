//! Student and group routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use database::{group, student, Group, Student};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Substring match over external ID, names and phone.
    pub search: Option<String>,
}

/// List students, optionally filtered by a search term.
pub async fn list_api(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>> {
    let students = student::list_students(state.db.pool(), params.search.as_deref()).await?;
    Ok(Json(students))
}

/// Deactivate a student. Their history is kept.
pub async fn deactivate_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Student>> {
    student::deactivate_student(state.db.pool(), id).await?;
    let updated = student::get_student(state.db.pool(), id).await?;
    Ok(Json(updated))
}

/// List all groups with their chat bindings.
pub async fn groups_api(State(state): State<AppState>) -> Result<Json<Vec<Group>>> {
    let groups = group::list_groups(state.db.pool()).await?;
    Ok(Json(groups))
}
