//! Payment statistics for staff commands and the admin backend.

use chrono::{Duration, NaiveDate};
use database::{
    group, receipt, schedule, student, Database, PaymentSchedule, Receipt, ReceiptStatus, Stage,
};
use serde::Serialize;

use crate::error::WorkflowError;

/// Top-level counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub active_students: i64,
    pub active_groups: i64,
    pub active_schedules: i64,
    pub pending_receipts: i64,
    pub approved_receipts: i64,
    pub rejected_receipts: i64,
}

/// Per-schedule payment progress.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScheduleStats {
    pub schedule: PaymentSchedule,
    pub submitted: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    /// Active students who have not submitted anything for this schedule.
    pub missing: i64,
}

/// Read-only reporting over the payment data.
#[derive(Debug, Clone)]
pub struct StatsService {
    db: Database,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, WorkflowError> {
        Ok(DashboardStats {
            active_students: student::count_active(self.db.pool()).await?,
            active_groups: group::count_active(self.db.pool()).await?,
            active_schedules: schedule::list_active(self.db.pool()).await?.len() as i64,
            pending_receipts: receipt::count_by_status(self.db.pool(), ReceiptStatus::Pending)
                .await?,
            approved_receipts: receipt::count_by_status(self.db.pool(), ReceiptStatus::Approved)
                .await?,
            rejected_receipts: receipt::count_by_status(self.db.pool(), ReceiptStatus::Rejected)
                .await?,
        })
    }

    /// Payment progress for one schedule.
    pub async fn schedule_breakdown(&self, schedule_id: i64) -> Result<ScheduleStats, WorkflowError> {
        let sched = schedule::get_schedule(self.db.pool(), schedule_id).await?;
        let submitted = receipt::count_for_schedule(self.db.pool(), schedule_id).await?;
        let approved =
            receipt::count_for_schedule_by_status(self.db.pool(), schedule_id, ReceiptStatus::Approved)
                .await?;
        let pending =
            receipt::count_for_schedule_by_status(self.db.pool(), schedule_id, ReceiptStatus::Pending)
                .await?;
        let rejected =
            receipt::count_for_schedule_by_status(self.db.pool(), schedule_id, ReceiptStatus::Rejected)
                .await?;
        let active_students = student::count_active(self.db.pool()).await?;

        Ok(ScheduleStats {
            schedule: sched,
            submitted,
            approved,
            pending,
            rejected,
            missing: (active_students - submitted).max(0),
        })
    }

    /// Progress for every active schedule, ordered by due date.
    pub async fn all_breakdowns(&self) -> Result<Vec<ScheduleStats>, WorkflowError> {
        let schedules = schedule::list_active(self.db.pool()).await?;
        let mut out = Vec::with_capacity(schedules.len());
        for sched in schedules {
            out.push(self.schedule_breakdown(sched.id).await?);
        }
        Ok(out)
    }

    /// Active schedules due within the next `horizon_days`.
    pub async fn upcoming(
        &self,
        today: NaiveDate,
        horizon_days: i64,
    ) -> Result<Vec<PaymentSchedule>, WorkflowError> {
        Ok(schedule::list_between(self.db.pool(), today, today + Duration::days(horizon_days))
            .await?)
    }

    /// Active schedules whose due date has passed.
    pub async fn overdue(&self, today: NaiveDate) -> Result<Vec<PaymentSchedule>, WorkflowError> {
        Ok(schedule::list_overdue(self.db.pool(), today).await?)
    }

    /// A student's receipts with their stages, newest first.
    pub async fn student_history(
        &self,
        student_id: i64,
    ) -> Result<Vec<(Receipt, Stage)>, WorkflowError> {
        let receipts = receipt::list_for_student(self.db.pool(), student_id).await?;
        let mut out = Vec::with_capacity(receipts.len());
        for r in receipts {
            let sched = schedule::get_schedule(self.db.pool(), r.schedule_id).await?;
            out.push((r, sched.stage));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::NewStudent;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn add_student(db: &Database, n: u32) -> i64 {
        student::create_student(
            db.pool(),
            &NewStudent {
                chat_id: Some(n as i64),
                student_id: format!("STD{:04}", n),
                first_name: "Ali".to_string(),
                last_name: "Valiyev".to_string(),
                patronymic: "Vali ogli".to_string(),
                passport_series: "AB".to_string(),
                passport_number: format!("{:07}", n),
                national_id: format!("{:014}", n),
                phone: "+998901234567".to_string(),
                group_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_schedule_breakdown_counts() {
        let db = test_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let s1 = add_student(&db, 1).await;
        let s2 = add_student(&db, 2).await;
        add_student(&db, 3).await;

        let sched = schedule::create_schedule(
            db.pool(),
            "2025-2026",
            Stage::Quarter1,
            today + Duration::days(30),
            1_000_000,
        )
        .await
        .unwrap();

        let r1 = receipt::create_receipt(db.pool(), s1, sched.id, "f1").await.unwrap();
        receipt::create_receipt(db.pool(), s2, sched.id, "f2").await.unwrap();
        receipt::review_transition(db.pool(), r1.id, ReceiptStatus::Approved, "admin", "")
            .await
            .unwrap();

        let stats = StatsService::new(db.clone());
        let breakdown = stats.schedule_breakdown(sched.id).await.unwrap();
        assert_eq!(breakdown.submitted, 2);
        assert_eq!(breakdown.approved, 1);
        assert_eq!(breakdown.pending, 1);
        assert_eq!(breakdown.rejected, 0);
        assert_eq!(breakdown.missing, 1);

        let dashboard = stats.dashboard().await.unwrap();
        assert_eq!(dashboard.active_students, 3);
        assert_eq!(dashboard.pending_receipts, 1);
        assert_eq!(dashboard.approved_receipts, 1);
    }

    #[tokio::test]
    async fn test_upcoming_and_overdue_windows() {
        let db = test_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter1, today - Duration::days(5), 1)
            .await
            .unwrap();
        schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter2, today + Duration::days(10), 1)
            .await
            .unwrap();
        schedule::create_schedule(db.pool(), "2025-2026", Stage::Quarter3, today + Duration::days(90), 1)
            .await
            .unwrap();

        let stats = StatsService::new(db.clone());
        let upcoming = stats.upcoming(today, 30).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].stage, Stage::Quarter2);

        let overdue = stats.overdue(today).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].stage, Stage::Quarter1);
    }
}
