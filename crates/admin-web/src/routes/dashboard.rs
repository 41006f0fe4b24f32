//! Dashboard statistics route.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use database::PaymentSchedule;
use serde::Serialize;
use workflow::{DashboardStats, ScheduleStats};

use crate::error::Result;
use crate::state::AppState;

/// How far ahead the dashboard looks for upcoming due dates.
const UPCOMING_HORIZON_DAYS: i64 = 30;

/// Dashboard payload: top-level counters plus per-schedule progress.
#[derive(Serialize)]
pub struct Stats {
    #[serde(flatten)]
    pub totals: DashboardStats,
    pub schedules: Vec<ScheduleStats>,
    pub upcoming: Vec<PaymentSchedule>,
    pub overdue: Vec<PaymentSchedule>,
}

/// Get dashboard statistics as JSON.
pub async fn stats_api(State(state): State<AppState>) -> Result<Json<Stats>> {
    let today = Utc::now().date_naive();
    let totals = state.stats.dashboard().await?;
    let schedules = state.stats.all_breakdowns().await?;
    let upcoming = state.stats.upcoming(today, UPCOMING_HORIZON_DAYS).await?;
    let overdue = state.stats.overdue(today).await?;
    Ok(Json(Stats { totals, schedules, upcoming, overdue }))
}
