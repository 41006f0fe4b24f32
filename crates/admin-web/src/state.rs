//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use workflow::{MessageSender, ReminderService, ReviewService, StatsService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Reporting over the payment data.
    pub stats: StatsService,
    /// Review decisions with student notification.
    pub review: ReviewService,
    /// Reminder seeding for newly created schedules.
    pub reminders: ReminderService,
    /// Transport for student notifications.
    pub sender: Arc<dyn MessageSender>,
}

impl AppState {
    pub fn new(db: Database, reminder_days: Vec<i64>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            stats: StatsService::new(db.clone()),
            review: ReviewService::new(db.clone()),
            reminders: ReminderService::new(db.clone(), reminder_days),
            db,
            sender,
        }
    }
}
