//! Route handlers for the admin backend.

pub mod dashboard;
pub mod health;
pub mod receipts;
pub mod schedules;
pub mod students;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Dashboard
        .route("/api/stats", get(dashboard::stats_api))
        // Students and groups
        .route("/api/students", get(students::list_api))
        .route("/api/students/:id/deactivate", post(students::deactivate_api))
        .route("/api/groups", get(students::groups_api))
        // Schedules and reminder templates
        .route("/api/schedules", get(schedules::list_api).post(schedules::create_api))
        .route("/api/templates", get(schedules::templates_api))
        .route("/api/templates/:days", put(schedules::upsert_template_api))
        // Receipts
        .route("/api/receipts", get(receipts::list_api))
        .route("/api/receipts/:id/review", post(receipts::review_api))
}
