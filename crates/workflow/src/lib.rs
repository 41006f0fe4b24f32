//! Payment tracking workflows.
//!
//! This crate ties the persistence layer to the messaging transport:
//!
//! - Reminder generation and the periodic dispatch sweep
//! - The receipt submission conversation
//! - Staff review of submitted receipts
//! - Anonymous questions to the accounting office
//! - Statistics for staff commands and the admin backend
//!
//! Message delivery goes through the [`MessageSender`] trait so the bot,
//! the admin backend and the tests can share the same services.

pub mod auth;
pub mod config;
pub mod error;
pub mod inbox;
pub mod notify;
pub mod reminders;
pub mod review;
pub mod sender;
pub mod stats;
pub mod submission;
pub mod telegram;
pub mod texts;

pub use auth::AuthContext;
pub use config::Settings;
pub use error::WorkflowError;
pub use inbox::{InboxService, ReplyOutcome};
pub use notify::StaffNotifier;
pub use reminders::{ReminderService, ReminderSweep};
pub use review::{ReviewOutcome, ReviewService};
pub use sender::{
    ButtonRows, FileKind, LoggingSender, MessageSender, NoOpSender, RecordingSender, SentMessage,
    StoredFile,
};
pub use stats::{DashboardStats, ScheduleStats, StatsService};
pub use submission::{IncomingFile, Reply, SubmissionWorkflow};
pub use telegram::TelegramSender;
