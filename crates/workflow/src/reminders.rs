//! Payment reminder generation and dispatch.
//!
//! Reminder rows are seeded per (schedule, student, offset) triple and
//! dispatched by a periodic sweep. A reminder becomes due once the days
//! remaining until the due date drop to its offset or below, so a sweep
//! that was down on the exact day still fires on the next run. When
//! several offsets of the same pair are due at once (catch-up after
//! downtime), only the most urgent one is delivered and the rest are
//! retired silently.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use database::{reminder, schedule, student, template, Database, UnsentReminder};
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::sender::MessageSender;
use crate::texts;

/// Outcome counters of one reminder sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSweep {
    /// New reminder rows seeded by the generator.
    pub generated: u64,
    /// Reminders delivered to at least one chat.
    pub delivered: u64,
    /// Due reminders retired without delivery because a more urgent
    /// offset of the same pair fired in the same sweep.
    pub suppressed: u64,
    /// Due reminders retired because the student has no reachable chat.
    pub skipped: u64,
}

/// Generates and dispatches payment reminders.
#[derive(Debug, Clone)]
pub struct ReminderService {
    db: Database,
    offsets: Vec<i64>,
}

impl ReminderService {
    pub fn new(db: Database, offsets: Vec<i64>) -> Self {
        Self { db, offsets }
    }

    /// Seed reminder rows for one schedule across all active students.
    ///
    /// Each (student, offset) pair is inserted independently; a failed pair
    /// is logged and counted without aborting the rest, and a rerun fills
    /// in exactly the missing rows.
    pub async fn generate_for_schedule(&self, schedule_id: i64) -> Result<u64, WorkflowError> {
        let students = student::list_active(self.db.pool()).await?;

        let mut created = 0u64;
        let mut failed = 0u64;
        for student in &students {
            for &days in &self.offsets {
                match reminder::create_if_absent(self.db.pool(), schedule_id, student.id, days)
                    .await
                {
                    Ok(true) => created += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            "Failed to seed reminder (schedule {}, student {}, offset {}): {}",
                            schedule_id, student.id, days, e
                        );
                        failed += 1;
                    }
                }
            }
        }

        if created > 0 || failed > 0 {
            info!(
                "Seeded {} reminder(s) for schedule {} ({} failed)",
                created, schedule_id, failed
            );
        }
        Ok(created)
    }

    /// Seed reminder rows for every active schedule.
    pub async fn generate_all(&self) -> Result<u64, WorkflowError> {
        let schedules = schedule::list_active(self.db.pool()).await?;

        let mut created = 0u64;
        for schedule in &schedules {
            created += self.generate_for_schedule(schedule.id).await?;
        }
        Ok(created)
    }

    /// Run one full sweep: seed missing rows, then deliver due reminders.
    ///
    /// Safe to call repeatedly; every reminder is delivered at most once.
    pub async fn check_and_send(
        &self,
        today: NaiveDate,
        sender: &dyn MessageSender,
    ) -> Result<ReminderSweep, WorkflowError> {
        let mut sweep = ReminderSweep {
            generated: self.generate_all().await?,
            ..Default::default()
        };

        let unsent = reminder::list_unsent(self.db.pool()).await?;

        // Group due reminders per (schedule, student) pair.
        let mut due: BTreeMap<(i64, i64), Vec<&UnsentReminder>> = BTreeMap::new();
        for r in &unsent {
            if r.days_until_due(today) <= r.days_before {
                due.entry((r.schedule_id, r.student_id)).or_default().push(r);
            }
        }

        for ((schedule_id, student_id), mut batch) in due {
            batch.sort_by_key(|r| r.days_before);
            let most_urgent = batch[0];

            let outcome = self.deliver(most_urgent, today, sender).await?;
            match outcome {
                Delivery::Sent => sweep.delivered += 1,
                Delivery::NoTarget => {
                    debug!(
                        "No reachable chat for student {} (schedule {})",
                        student_id, schedule_id
                    );
                    sweep.skipped += 1;
                }
            }

            // Retire the whole batch so stale offsets never fire later.
            for r in &batch {
                reminder::mark_sent(self.db.pool(), r.id).await?;
            }
            sweep.suppressed += batch.len() as u64 - 1;
        }

        if sweep.delivered > 0 || sweep.skipped > 0 {
            info!(
                "Reminder sweep: {} delivered, {} suppressed, {} skipped",
                sweep.delivered, sweep.suppressed, sweep.skipped
            );
        }
        Ok(sweep)
    }

    /// Render and send one reminder to the student and their group chat.
    async fn deliver(
        &self,
        r: &UnsentReminder,
        today: NaiveDate,
        sender: &dyn MessageSender,
    ) -> Result<Delivery, WorkflowError> {
        if r.chat_id.is_none() && r.group_chat_id.is_none() {
            return Ok(Delivery::NoTarget);
        }

        let text = self.render(r, today).await?;

        if let Some(chat_id) = r.chat_id {
            if let Err(e) = sender.send_text(chat_id, &text).await {
                warn!("Failed to send reminder to student chat {}: {}", chat_id, e);
            }
        }

        if let Some(group_chat_id) = r.group_chat_id {
            let full_name = format!("{} {} {}", r.last_name, r.first_name, r.patronymic);
            let group_text = texts::group_reminder(&full_name, &text);
            if let Err(e) = sender.send_text(group_chat_id, &group_text).await {
                warn!(
                    "Failed to send reminder to group chat {}: {}",
                    group_chat_id, e
                );
            }
        }

        Ok(Delivery::Sent)
    }

    /// Render the reminder text from the offset's template, or the default.
    ///
    /// The {days} placeholder reflects the real days remaining, not the
    /// offset, so catch-up deliveries read correctly.
    async fn render(&self, r: &UnsentReminder, today: NaiveDate) -> Result<String, WorkflowError> {
        let days_left = r.days_until_due(today).max(0);

        let rendered = match template::get_active_for_offset(self.db.pool(), r.days_before).await? {
            Some(t) => t
                .message_text
                .replace("{student_name}", &r.first_name)
                .replace("{stage}", r.stage.label())
                .replace("{due_date}", &texts::format_date(r.due_date))
                .replace("{days}", &days_left.to_string())
                .replace("{amount}", &texts::format_amount(r.amount)),
            None => texts::default_reminder(&r.first_name, r.stage, r.due_date, r.amount, days_left),
        };

        Ok(rendered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    NoTarget,
}
