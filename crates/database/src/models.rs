//! Database models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Payment stage: one of four fixed installments per academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Stage {
    #[sqlx(rename = "1/4")]
    #[serde(rename = "1/4")]
    Quarter1,
    #[sqlx(rename = "2/4")]
    #[serde(rename = "2/4")]
    Quarter2,
    #[sqlx(rename = "3/4")]
    #[serde(rename = "3/4")]
    Quarter3,
    #[sqlx(rename = "4/4")]
    #[serde(rename = "4/4")]
    Quarter4,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Stage; 4] = [
        Stage::Quarter1,
        Stage::Quarter2,
        Stage::Quarter3,
        Stage::Quarter4,
    ];

    /// The user-facing label (also the stored form).
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Quarter1 => "1/4",
            Stage::Quarter2 => "2/4",
            Stage::Quarter3 => "3/4",
            Stage::Quarter4 => "4/4",
        }
    }

    /// Parse a stage from its label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1/4" => Some(Stage::Quarter1),
            "2/4" => Some(Stage::Quarter2),
            "3/4" => Some(Stage::Quarter3),
            "4/4" => Some(Stage::Quarter4),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Review state of a submitted receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Approved => "approved",
            ReceiptStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReceiptStatus::Pending),
            "approved" => Some(ReceiptStatus::Approved),
            "rejected" => Some(ReceiptStatus::Rejected),
            _ => None,
        }
    }

    /// Human-readable status in the bot's language.
    pub fn display(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "Kutilmoqda",
            ReceiptStatus::Approved => "Tasdiqlangan",
            ReceiptStatus::Rejected => "Rad etilgan",
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// Staff role for receipt review and administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Accountant,
}

/// A student, identified by the institute's external student id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    /// Linked messaging identity, if the student has ever talked to the bot.
    pub chat_id: Option<i64>,
    /// External student identifier (unique).
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    /// Passport series (two uppercase letters).
    pub passport_series: String,
    /// Passport number (seven digits).
    pub passport_number: String,
    /// 14-digit national identification number (unique).
    pub national_id: String,
    /// Normalized phone: +998XXXXXXXXX.
    pub phone: String,
    pub group_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

impl Student {
    /// "Lastname Firstname Patronymic" for display.
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.last_name, self.first_name, self.patronymic)
    }

    /// Passport series and number joined, e.g. "AB1234567".
    pub fn passport(&self) -> String {
        format!("{}{}", self.passport_series, self.passport_number)
    }
}

/// A student group with an optional chat binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    /// Bound messaging chat, if the bot was added to one.
    pub chat_id: Option<i64>,
    pub chat_title: String,
    pub is_active: bool,
    pub created_at: String,
}

/// A staff account allowed to review receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StaffAccount {
    pub id: i64,
    pub chat_id: Option<i64>,
    pub full_name: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: String,
}

/// A payment installment deadline for an academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentSchedule {
    pub id: i64,
    /// e.g. "2024-2025".
    pub academic_year: String,
    pub stage: Stage,
    pub due_date: NaiveDate,
    /// Amount in so'm.
    pub amount: i64,
    pub is_active: bool,
    pub created_at: String,
}

/// A submitted proof-of-payment awaiting staff review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub student_id: i64,
    pub schedule_id: i64,
    /// Provider file reference of the uploaded receipt.
    pub file_id: String,
    pub status: ReceiptStatus,
    pub submitted_at: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub notes: String,
}

/// One scheduled reminder per (schedule, student, offset) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentReminder {
    pub id: i64,
    pub schedule_id: i64,
    pub student_id: i64,
    /// Days before the due date at which this reminder fires; 0 is due day.
    pub days_before: i64,
    pub is_sent: bool,
    pub sent_at: Option<String>,
}

/// A staff-editable message template for a reminder offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReminderTemplate {
    pub days_before: i64,
    /// Template text with {student_name}, {stage}, {due_date}, {days},
    /// {amount} placeholders.
    pub message_text: String,
    pub is_active: bool,
}

/// An anonymous question for the accounting office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnonymousMessage {
    pub id: i64,
    pub sender_chat_id: i64,
    pub message_text: String,
    pub reply_text: Option<String>,
    pub replied_by: Option<String>,
    pub replied_at: Option<String>,
    pub is_replied: bool,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.label()), Some(stage));
        }
        assert_eq!(Stage::parse("5/4"), None);
        assert_eq!(Stage::parse(""), None);
    }

    #[test]
    fn test_receipt_status_round_trip() {
        for status in [
            ReceiptStatus::Pending,
            ReceiptStatus::Approved,
            ReceiptStatus::Rejected,
        ] {
            assert_eq!(ReceiptStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReceiptStatus::parse("unknown"), None);
    }

    #[test]
    fn test_student_display_helpers() {
        let student = Student {
            id: 1,
            chat_id: None,
            student_id: "STD1001".to_string(),
            first_name: "Ali".to_string(),
            last_name: "Valiyev".to_string(),
            patronymic: "Vali ogli".to_string(),
            passport_series: "AB".to_string(),
            passport_number: "1234567".to_string(),
            national_id: "12345678901234".to_string(),
            phone: "+998901234567".to_string(),
            group_id: None,
            is_active: true,
            created_at: "2024-01-01".to_string(),
        };
        assert_eq!(student.full_name(), "Valiyev Ali Vali ogli");
        assert_eq!(student.passport(), "AB1234567");
    }
}
