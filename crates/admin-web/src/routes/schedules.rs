//! Payment schedule and reminder template routes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use database::{schedule, template, PaymentSchedule, ReminderTemplate, Stage};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// List all payment schedules.
pub async fn list_api(State(state): State<AppState>) -> Result<Json<Vec<PaymentSchedule>>> {
    let schedules = schedule::list_schedules(state.db.pool()).await?;
    Ok(Json(schedules))
}

#[derive(Debug, Deserialize)]
pub struct CreateSchedule {
    pub academic_year: String,
    pub stage: Stage,
    pub due_date: NaiveDate,
    /// Amount in so'm.
    pub amount: i64,
}

#[derive(Serialize)]
pub struct CreatedSchedule {
    #[serde(flatten)]
    pub schedule: PaymentSchedule,
    /// Reminder rows seeded for this schedule.
    pub reminders_seeded: u64,
}

/// Create a schedule and seed its reminder rows.
pub async fn create_api(
    State(state): State<AppState>,
    Json(body): Json<CreateSchedule>,
) -> Result<Json<CreatedSchedule>> {
    if body.amount <= 0 {
        return Err(AdminError::BadRequest("amount must be positive".to_string()));
    }
    if body.academic_year.trim().is_empty() {
        return Err(AdminError::BadRequest("academic_year is required".to_string()));
    }

    let created = schedule::create_schedule(
        state.db.pool(),
        body.academic_year.trim(),
        body.stage,
        body.due_date,
        body.amount,
    )
    .await?;

    let reminders_seeded = state.reminders.generate_for_schedule(created.id).await?;

    Ok(Json(CreatedSchedule {
        schedule: created,
        reminders_seeded,
    }))
}

/// List all reminder templates.
pub async fn templates_api(State(state): State<AppState>) -> Result<Json<Vec<ReminderTemplate>>> {
    let templates = template::list_templates(state.db.pool()).await?;
    Ok(Json(templates))
}

#[derive(Debug, Deserialize)]
pub struct UpsertTemplate {
    pub message_text: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create or replace the template for a reminder offset.
pub async fn upsert_template_api(
    State(state): State<AppState>,
    Path(days): Path<i64>,
    Json(body): Json<UpsertTemplate>,
) -> Result<Json<ReminderTemplate>> {
    if days < 0 {
        return Err(AdminError::BadRequest("days must be >= 0".to_string()));
    }
    if body.message_text.trim().is_empty() {
        return Err(AdminError::BadRequest("message_text is required".to_string()));
    }

    template::upsert_template(state.db.pool(), days, &body.message_text, body.is_active).await?;
    Ok(Json(ReminderTemplate {
        days_before: days,
        message_text: body.message_text,
        is_active: body.is_active,
    }))
}
