//! Receipt submission conversation.
//!
//! A student walks through a fixed sequence of questions (identity,
//! passport, contact, payment stage, receipt file) and confirms the
//! collected draft before anything is written to the database. Returning
//! students skip straight to stage selection.

use std::collections::HashMap;

use database::{receipt, schedule, student, validation, Database, NewStudent, ReceiptStatus, Stage};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::notify::StaffNotifier;
use crate::sender::{ButtonRows, FileKind, MessageSender, StoredFile};
use crate::texts;

/// Which question the conversation is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStep {
    StudentId,
    FirstName,
    LastName,
    Patronymic,
    Passport,
    NationalId,
    Phone,
    Stage,
    File,
    Confirm,
}

/// Accumulated answers of one submission conversation.
#[derive(Debug, Clone)]
struct ReceiptDraft {
    step: SubmitStep,
    /// Set when the student already exists, skipping identity questions.
    existing_student: Option<i64>,
    student_id: String,
    first_name: String,
    last_name: String,
    patronymic: String,
    passport_series: String,
    passport_number: String,
    national_id: String,
    phone: String,
    stage: Option<Stage>,
    schedule_id: Option<i64>,
    file: Option<StoredFile>,
}

impl ReceiptDraft {
    fn new() -> Self {
        Self {
            step: SubmitStep::StudentId,
            existing_student: None,
            student_id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            patronymic: String::new(),
            passport_series: String::new(),
            passport_number: String::new(),
            national_id: String::new(),
            phone: String::new(),
            stage: None,
            schedule_id: None,
            file: None,
        }
    }

    fn for_existing(student: &database::Student) -> Self {
        Self {
            step: SubmitStep::Stage,
            existing_student: Some(student.id),
            student_id: student.student_id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            patronymic: student.patronymic.clone(),
            passport_series: student.passport_series.clone(),
            passport_number: student.passport_number.clone(),
            national_id: student.national_id.clone(),
            phone: student.phone.clone(),
            stage: None,
            schedule_id: None,
            file: None,
        }
    }
}

/// A file attached to an incoming message, before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file: StoredFile,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

/// What the bot should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub buttons: ButtonRows,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(text: impl Into<String>, buttons: ButtonRows) -> Self {
        Self {
            text: text.into(),
            buttons,
        }
    }
}

/// Inline keyboard offering the four payment stages.
fn stage_keyboard() -> ButtonRows {
    vec![Stage::ALL
        .iter()
        .map(|s| (s.label().to_string(), format!("stage_{}", s.label())))
        .collect()]
}

/// Inline keyboard for the final confirmation step.
fn confirm_keyboard() -> ButtonRows {
    vec![vec![
        ("✅ Tasdiqlash".to_string(), "confirm_receipt".to_string()),
        ("❌ Bekor qilish".to_string(), "cancel_receipt".to_string()),
    ]]
}

/// Drives receipt submission conversations, one per chat.
pub struct SubmissionWorkflow {
    db: Database,
    notifier: StaffNotifier,
    allowed_file_types: Vec<String>,
    max_file_size: i64,
    sessions: Mutex<HashMap<i64, ReceiptDraft>>,
}

impl SubmissionWorkflow {
    pub fn new(
        db: Database,
        notifier: StaffNotifier,
        allowed_file_types: Vec<String>,
        max_file_size: i64,
    ) -> Self {
        Self {
            db,
            notifier,
            allowed_file_types,
            max_file_size,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Begin (or restart) a submission conversation for a chat.
    pub async fn start(&self, chat_id: i64) -> Result<Reply, WorkflowError> {
        let existing = student::get_by_chat_id(self.db.pool(), chat_id).await?;

        let (draft, reply) = match existing {
            Some(ref s) if s.is_active => (
                ReceiptDraft::for_existing(s),
                Reply::with_buttons(texts::known_student_summary(s), stage_keyboard()),
            ),
            _ => (ReceiptDraft::new(), Reply::text(texts::PROMPT_STUDENT_ID)),
        };

        self.sessions.lock().await.insert(chat_id, draft);
        Ok(reply)
    }

    /// Whether a submission conversation is in progress for this chat.
    pub async fn is_active(&self, chat_id: i64) -> bool {
        self.sessions.lock().await.contains_key(&chat_id)
    }

    /// Abort the conversation, if any.
    pub async fn cancel(&self, chat_id: i64) -> Option<Reply> {
        self.sessions
            .lock()
            .await
            .remove(&chat_id)
            .map(|_| Reply::text(texts::CANCELLED))
    }

    /// Feed a text answer into the conversation.
    ///
    /// Returns None when no conversation is active for this chat.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Result<Option<Reply>, WorkflowError> {
        let mut sessions = self.sessions.lock().await;
        let Some(draft) = sessions.get_mut(&chat_id) else {
            return Ok(None);
        };
        let text = text.trim();

        let reply = match draft.step {
            SubmitStep::StudentId => match validation::validate_student_id(text) {
                Ok(()) => {
                    draft.student_id = text.to_string();
                    draft.step = SubmitStep::FirstName;
                    Reply::text(texts::PROMPT_FIRST_NAME)
                }
                Err(_) => Reply::text(texts::ERR_STUDENT_ID),
            },
            SubmitStep::FirstName => match validation::validate_name("first_name", text) {
                Ok(()) => {
                    draft.first_name = text.to_string();
                    draft.step = SubmitStep::LastName;
                    Reply::text(texts::PROMPT_LAST_NAME)
                }
                Err(_) => Reply::text(texts::ERR_NAME_SHORT),
            },
            SubmitStep::LastName => match validation::validate_name("last_name", text) {
                Ok(()) => {
                    draft.last_name = text.to_string();
                    draft.step = SubmitStep::Patronymic;
                    Reply::text(texts::PROMPT_PATRONYMIC)
                }
                Err(_) => Reply::text(texts::ERR_NAME_SHORT),
            },
            SubmitStep::Patronymic => match validation::validate_name("patronymic", text) {
                Ok(()) => {
                    draft.patronymic = text.to_string();
                    draft.step = SubmitStep::Passport;
                    Reply::text(texts::PROMPT_PASSPORT)
                }
                Err(_) => Reply::text(texts::ERR_NAME_SHORT),
            },
            SubmitStep::Passport => {
                let normalized = validation::normalize_passport(text);
                match validation::parse_passport(&normalized) {
                    Ok((series, number)) => {
                        draft.passport_series = series;
                        draft.passport_number = number;
                        draft.step = SubmitStep::NationalId;
                        Reply::text(texts::PROMPT_NATIONAL_ID)
                    }
                    Err(_) => Reply::text(texts::ERR_PASSPORT),
                }
            }
            SubmitStep::NationalId => match validation::validate_national_id(text) {
                Ok(()) => {
                    draft.national_id = text.to_string();
                    draft.step = SubmitStep::Phone;
                    Reply::text(texts::PROMPT_PHONE)
                }
                Err(_) => Reply::text(texts::ERR_NATIONAL_ID),
            },
            SubmitStep::Phone => {
                let normalized = validation::normalize_phone(text);
                match validation::validate_phone(&normalized) {
                    Ok(()) => {
                        draft.phone = normalized;
                        draft.step = SubmitStep::Stage;
                        Reply::with_buttons(texts::PROMPT_STAGE, stage_keyboard())
                    }
                    Err(_) => Reply::text(texts::ERR_PHONE),
                }
            }
            // Text is not what we are waiting for; repeat the prompt.
            SubmitStep::Stage => Reply::with_buttons(texts::PROMPT_STAGE, stage_keyboard()),
            SubmitStep::File => Reply::text(texts::PROMPT_FILE),
            SubmitStep::Confirm => self.confirmation_reply(draft),
        };

        Ok(Some(reply))
    }

    /// Handle a `stage_<label>` button press.
    pub async fn handle_stage(&self, chat_id: i64, label: &str) -> Result<Reply, WorkflowError> {
        let mut sessions = self.sessions.lock().await;
        let Some(draft) = sessions.get_mut(&chat_id) else {
            return Ok(Reply::text(texts::ERR_NOT_IN_FLOW));
        };
        if draft.step != SubmitStep::Stage {
            return Ok(self.step_prompt(draft));
        }

        let Some(stage) = Stage::parse(label) else {
            return Ok(Reply::with_buttons(texts::PROMPT_STAGE, stage_keyboard()));
        };

        let Some(sched) = schedule::active_for_stage(self.db.pool(), stage).await? else {
            return Ok(Reply::with_buttons(texts::ERR_NO_SCHEDULE, stage_keyboard()));
        };

        draft.stage = Some(stage);
        draft.schedule_id = Some(sched.id);
        draft.step = SubmitStep::File;
        Ok(Reply::text(texts::stage_chosen(stage)))
    }

    /// Feed an attached file into the conversation.
    ///
    /// Returns None when no conversation is active for this chat.
    pub async fn handle_file(
        &self,
        chat_id: i64,
        incoming: IncomingFile,
    ) -> Result<Option<Reply>, WorkflowError> {
        let mut sessions = self.sessions.lock().await;
        let Some(draft) = sessions.get_mut(&chat_id) else {
            return Ok(None);
        };
        if draft.step != SubmitStep::File {
            return Ok(Some(self.step_prompt(draft)));
        }

        // Photos arrive without a MIME type; documents must carry an allowed one.
        if incoming.file.kind == FileKind::Document {
            let allowed = incoming
                .mime_type
                .as_deref()
                .map(|m| self.allowed_file_types.iter().any(|t| t == m))
                .unwrap_or(false);
            if !allowed {
                return Ok(Some(Reply::text(texts::ERR_FILE_TYPE)));
            }
        }
        if incoming.file_size.is_some_and(|size| size > self.max_file_size) {
            return Ok(Some(Reply::text(texts::ERR_FILE_SIZE)));
        }

        draft.file = Some(incoming.file);
        draft.step = SubmitStep::Confirm;
        Ok(Some(self.confirmation_reply(draft)))
    }

    /// Handle the `confirm_receipt` button: persist everything and notify staff.
    ///
    /// The draft stays in the session map until persistence succeeds, so a
    /// storage failure leaves the conversation retryable instead of
    /// swallowing it.
    pub async fn confirm(
        &self,
        chat_id: i64,
        sender: &dyn MessageSender,
    ) -> Result<Reply, WorkflowError> {
        let draft = {
            let sessions = self.sessions.lock().await;
            match sessions.get(&chat_id) {
                Some(d) if d.step == SubmitStep::Confirm => Some(d.clone()),
                _ => None,
            }
        };
        let Some(draft) = draft else {
            return Ok(Reply::text(texts::ERR_NOT_IN_FLOW));
        };

        match self.persist_draft(chat_id, &draft, sender).await {
            Ok(reply) => {
                self.sessions.lock().await.remove(&chat_id);
                Ok(reply)
            }
            Err(e) => {
                warn!("Failed to persist submission for chat {}: {}", chat_id, e);
                Ok(Reply::with_buttons(texts::ERR_SAVE_FAILED, confirm_keyboard()))
            }
        }
    }

    /// Write the confirmed draft: student record, receipt, staff broadcast.
    async fn persist_draft(
        &self,
        chat_id: i64,
        draft: &ReceiptDraft,
        sender: &dyn MessageSender,
    ) -> Result<Reply, WorkflowError> {
        let (Some(stage), Some(schedule_id), Some(file)) =
            (draft.stage, draft.schedule_id, draft.file.clone())
        else {
            return Ok(Reply::text(texts::ERR_NOT_IN_FLOW));
        };

        // Resolve or create the student record.
        let student = match draft.existing_student {
            Some(id) => student::get_student(self.db.pool(), id).await?,
            None => match student::get_by_external_id(self.db.pool(), &draft.student_id).await? {
                Some(existing) => {
                    if existing.chat_id.is_none() {
                        student::bind_chat_id(self.db.pool(), existing.id, chat_id).await?;
                    }
                    existing
                }
                None => {
                    student::create_student(
                        self.db.pool(),
                        &NewStudent {
                            chat_id: Some(chat_id),
                            student_id: draft.student_id.clone(),
                            first_name: draft.first_name.clone(),
                            last_name: draft.last_name.clone(),
                            patronymic: draft.patronymic.clone(),
                            passport_series: draft.passport_series.clone(),
                            passport_number: draft.passport_number.clone(),
                            national_id: draft.national_id.clone(),
                            phone: draft.phone.clone(),
                            group_id: None,
                        },
                    )
                    .await?
                }
            },
        };

        let sched = schedule::get_schedule(self.db.pool(), schedule_id).await?;

        // One receipt per stage; a rejected one may be replaced.
        let saved = match receipt::find_by_pair(self.db.pool(), student.id, sched.id).await? {
            Some(existing) if existing.status == ReceiptStatus::Rejected => {
                receipt::resubmit(self.db.pool(), existing.id, &file.file_id).await?;
                receipt::get_receipt(self.db.pool(), existing.id).await?
            }
            Some(existing) => {
                return Ok(Reply::text(texts::duplicate_receipt(existing.status)));
            }
            None => {
                receipt::create_receipt(self.db.pool(), student.id, sched.id, &file.file_id).await?
            }
        };

        info!(
            "Receipt {} submitted by student {} for stage {}",
            saved.id,
            student.student_id,
            stage.label()
        );

        let group_name = match student.group_id {
            Some(group_id) => Some(database::group::get_group(self.db.pool(), group_id).await?.name),
            None => None,
        };
        let caption = texts::staff_receipt_caption(&student, group_name.as_deref(), &sched, &saved);
        let buttons = vec![vec![
            (
                "✅ Tasdiqlash".to_string(),
                format!("approve_receipt_{}", saved.id),
            ),
            (
                "❌ Rad etish".to_string(),
                format!("reject_receipt_{}", saved.id),
            ),
        ]];
        self.notifier
            .broadcast_file(sender, &file, &caption, Some(&buttons))
            .await?;

        Ok(Reply::text(texts::SUBMITTED))
    }

    fn confirmation_reply(&self, draft: &ReceiptDraft) -> Reply {
        match draft.stage {
            Some(stage) => Reply::with_buttons(
                texts::confirmation_summary(
                    &draft.student_id,
                    &draft.last_name,
                    &draft.first_name,
                    &draft.patronymic,
                    &format!("{}{}", draft.passport_series, draft.passport_number),
                    &draft.national_id,
                    &draft.phone,
                    stage,
                ),
                confirm_keyboard(),
            ),
            None => Reply::text(texts::ERR_NOT_IN_FLOW),
        }
    }

    /// Repeat the prompt for whatever the conversation is waiting on.
    fn step_prompt(&self, draft: &ReceiptDraft) -> Reply {
        match draft.step {
            SubmitStep::StudentId => Reply::text(texts::PROMPT_STUDENT_ID),
            SubmitStep::FirstName => Reply::text(texts::PROMPT_FIRST_NAME),
            SubmitStep::LastName => Reply::text(texts::PROMPT_LAST_NAME),
            SubmitStep::Patronymic => Reply::text(texts::PROMPT_PATRONYMIC),
            SubmitStep::Passport => Reply::text(texts::PROMPT_PASSPORT),
            SubmitStep::NationalId => Reply::text(texts::PROMPT_NATIONAL_ID),
            SubmitStep::Phone => Reply::text(texts::PROMPT_PHONE),
            SubmitStep::Stage => Reply::with_buttons(texts::PROMPT_STAGE, stage_keyboard()),
            SubmitStep::File => Reply::text(texts::PROMPT_FILE),
            SubmitStep::Confirm => self.confirmation_reply(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOWED_FILE_TYPES;
    use crate::sender::RecordingSender;
    use chrono::NaiveDate;
    use database::{staff, StaffRole};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn workflow(db: &Database, admin_ids: Vec<i64>) -> SubmissionWorkflow {
        SubmissionWorkflow::new(
            db.clone(),
            StaffNotifier::new(db.clone(), admin_ids),
            DEFAULT_ALLOWED_FILE_TYPES.iter().map(|s| s.to_string()).collect(),
            10 * 1024 * 1024,
        )
    }

    async fn seed_schedule(db: &Database, stage: Stage) -> database::PaymentSchedule {
        schedule::create_schedule(
            db.pool(),
            "2025-2026",
            stage,
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
            4_500_000,
        )
        .await
        .unwrap()
    }

    /// Walk a fresh student through the whole conversation up to the file step.
    async fn walk_to_file(flow: &SubmissionWorkflow, chat_id: i64) {
        flow.start(chat_id).await.unwrap();
        for answer in [
            "STD1001",
            "Ali",
            "Valiyev",
            "Vali ogli",
            "aa1234567",
            "12345678901234",
            "901234567",
        ] {
            flow.handle_text(chat_id, answer).await.unwrap().unwrap();
        }
        flow.handle_stage(chat_id, "1/4").await.unwrap();
    }

    fn pdf(file_id: &str) -> IncomingFile {
        IncomingFile {
            file: StoredFile::document(file_id),
            mime_type: Some("application/pdf".to_string()),
            file_size: Some(200_000),
        }
    }

    #[tokio::test]
    async fn test_full_submission_for_new_student() {
        let db = test_db().await;
        seed_schedule(&db, Stage::Quarter1).await;
        staff::upsert_staff(db.pool(), 900, "Buxgalter", StaffRole::Accountant)
            .await
            .unwrap();

        let flow = workflow(&db, vec![800]);
        let sender = RecordingSender::new();

        walk_to_file(&flow, 42).await;
        let confirm_prompt = flow.handle_file(42, pdf("file-1")).await.unwrap().unwrap();
        assert!(confirm_prompt.text.contains("Valiyev Ali Vali ogli"));
        assert!(confirm_prompt.text.contains("AA1234567"));
        assert!(confirm_prompt.text.contains("+998901234567"));

        let done = flow.confirm(42, &sender).await.unwrap();
        assert_eq!(done.text, texts::SUBMITTED);
        assert!(!flow.is_active(42).await);

        // Student persisted with chat bound and normalized fields.
        let saved = student::get_by_chat_id(db.pool(), 42).await.unwrap().unwrap();
        assert_eq!(saved.student_id, "STD1001");
        assert_eq!(saved.passport_series, "AA");
        assert_eq!(saved.phone, "+998901234567");

        // Receipt is pending review.
        let receipts = receipt::list_for_student(db.pool(), saved.id).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].status, ReceiptStatus::Pending);

        // Both the staff account and the env admin got the file with buttons.
        let sent = sender.take().await;
        assert_eq!(sent.len(), 2);
        let chat_ids: Vec<i64> = sent.iter().map(|m| m.chat_id).collect();
        assert!(chat_ids.contains(&900) && chat_ids.contains(&800));
        for m in &sent {
            assert!(m.text.contains("YANGI CHEK KELDI"));
            assert_eq!(m.buttons[0][0].1, format!("approve_receipt_{}", receipts[0].id));
        }
    }

    #[tokio::test]
    async fn test_validation_errors_keep_step() {
        let db = test_db().await;
        let flow = workflow(&db, vec![]);

        flow.start(7).await.unwrap();
        let reply = flow.handle_text(7, "ab").await.unwrap().unwrap();
        assert_eq!(reply.text, texts::ERR_STUDENT_ID);

        // Still at the same question.
        let reply = flow.handle_text(7, "STD1001").await.unwrap().unwrap();
        assert_eq!(reply.text, texts::PROMPT_FIRST_NAME);

        // Bad passport is re-asked.
        flow.handle_text(7, "Ali").await.unwrap();
        flow.handle_text(7, "Valiyev").await.unwrap();
        flow.handle_text(7, "Vali ogli").await.unwrap();
        let reply = flow.handle_text(7, "A1234567").await.unwrap().unwrap();
        assert_eq!(reply.text, texts::ERR_PASSPORT);
    }

    #[tokio::test]
    async fn test_returning_student_skips_identity() {
        let db = test_db().await;
        seed_schedule(&db, Stage::Quarter2).await;

        student::create_student(
            db.pool(),
            &NewStudent {
                chat_id: Some(42),
                student_id: "STD1001".to_string(),
                first_name: "Ali".to_string(),
                last_name: "Valiyev".to_string(),
                patronymic: "Vali ogli".to_string(),
                passport_series: "AB".to_string(),
                passport_number: "1234567".to_string(),
                national_id: "12345678901234".to_string(),
                phone: "+998901234567".to_string(),
                group_id: None,
            },
        )
        .await
        .unwrap();

        let flow = workflow(&db, vec![]);
        let reply = flow.start(42).await.unwrap();
        assert!(reply.text.contains("Sizning ma'lumotlaringiz"));
        assert!(!reply.buttons.is_empty());

        let reply = flow.handle_stage(42, "2/4").await.unwrap();
        assert!(reply.text.contains("2/4"));
    }

    #[tokio::test]
    async fn test_stage_without_schedule_is_rejected() {
        let db = test_db().await;
        let flow = workflow(&db, vec![]);

        walk_to_file(&flow, 1).await;
        // walk_to_file picked 1/4, but no schedule exists at all.
        let reply = flow.handle_stage(1, "1/4").await.unwrap();
        assert_eq!(reply.text, texts::ERR_NO_SCHEDULE);
    }

    #[tokio::test]
    async fn test_file_type_and_size_rules() {
        let db = test_db().await;
        seed_schedule(&db, Stage::Quarter1).await;
        let flow = workflow(&db, vec![]);

        walk_to_file(&flow, 5).await;

        let bad_type = IncomingFile {
            file: StoredFile::document("f"),
            mime_type: Some("video/mp4".to_string()),
            file_size: Some(1_000),
        };
        let reply = flow.handle_file(5, bad_type).await.unwrap().unwrap();
        assert_eq!(reply.text, texts::ERR_FILE_TYPE);

        let too_big = IncomingFile {
            file: StoredFile::document("f"),
            mime_type: Some("application/pdf".to_string()),
            file_size: Some(11 * 1024 * 1024),
        };
        let reply = flow.handle_file(5, too_big).await.unwrap().unwrap();
        assert_eq!(reply.text, texts::ERR_FILE_SIZE);

        // Photos have no MIME type and are accepted.
        let photo = IncomingFile {
            file: StoredFile::photo("p"),
            mime_type: None,
            file_size: Some(500_000),
        };
        let reply = flow.handle_file(5, photo).await.unwrap().unwrap();
        assert!(reply.text.contains("Ma'lumotlarni tekshiring"));
    }

    #[tokio::test]
    async fn test_duplicate_receipt_blocked_but_rejected_replaceable() {
        let db = test_db().await;
        seed_schedule(&db, Stage::Quarter1).await;
        let flow = workflow(&db, vec![]);
        let sender = RecordingSender::new();

        walk_to_file(&flow, 9).await;
        flow.handle_file(9, pdf("file-1")).await.unwrap();
        flow.confirm(9, &sender).await.unwrap();

        // Second submission for the same stage is refused while pending.
        flow.start(9).await.unwrap();
        flow.handle_stage(9, "1/4").await.unwrap();
        flow.handle_file(9, pdf("file-2")).await.unwrap();
        let reply = flow.confirm(9, &sender).await.unwrap();
        assert!(reply.text.contains("allaqachon chek yuborgan"));

        // After rejection the stage opens up again.
        let saved = student::get_by_chat_id(db.pool(), 9).await.unwrap().unwrap();
        let first = receipt::list_for_student(db.pool(), saved.id).await.unwrap()[0].clone();
        receipt::review_transition(db.pool(), first.id, ReceiptStatus::Rejected, "admin", "xira")
            .await
            .unwrap();

        flow.start(9).await.unwrap();
        flow.handle_stage(9, "1/4").await.unwrap();
        flow.handle_file(9, pdf("file-3")).await.unwrap();
        let reply = flow.confirm(9, &sender).await.unwrap();
        assert_eq!(reply.text, texts::SUBMITTED);

        let resubmitted = receipt::get_receipt(db.pool(), first.id).await.unwrap();
        assert_eq!(resubmitted.status, ReceiptStatus::Pending);
        assert_eq!(resubmitted.file_id, "file-3");
        assert!(resubmitted.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_reports_and_keeps_session() {
        let db = test_db().await;
        seed_schedule(&db, Stage::Quarter1).await;

        // A different student already owns this national id, so the
        // insert at confirm time hits the unique constraint.
        student::create_student(
            db.pool(),
            &NewStudent {
                chat_id: Some(1),
                student_id: "STD9999".to_string(),
                first_name: "Olim".to_string(),
                last_name: "Karimov".to_string(),
                patronymic: "Karim ogli".to_string(),
                passport_series: "AB".to_string(),
                passport_number: "7654321".to_string(),
                national_id: "12345678901234".to_string(),
                phone: "+998901111111".to_string(),
                group_id: None,
            },
        )
        .await
        .unwrap();

        let flow = workflow(&db, vec![800]);
        let sender = RecordingSender::new();

        walk_to_file(&flow, 200).await;
        flow.handle_file(200, pdf("file-1")).await.unwrap();

        // The student is told, the draft survives and staff hear nothing.
        let reply = flow.confirm(200, &sender).await.unwrap();
        assert_eq!(reply.text, texts::ERR_SAVE_FAILED);
        assert!(!reply.buttons.is_empty());
        assert!(flow.is_active(200).await);
        assert_eq!(sender.count().await, 0);

        // The conversation can still be abandoned cleanly.
        assert_eq!(flow.cancel(200).await.unwrap().text, texts::CANCELLED);
    }

    #[tokio::test]
    async fn test_cancel_clears_session() {
        let db = test_db().await;
        let flow = workflow(&db, vec![]);

        flow.start(3).await.unwrap();
        assert!(flow.is_active(3).await);
        assert_eq!(flow.cancel(3).await.unwrap().text, texts::CANCELLED);
        assert!(!flow.is_active(3).await);
        assert!(flow.cancel(3).await.is_none());

        // Text outside a conversation is not consumed.
        assert!(flow.handle_text(3, "salom").await.unwrap().is_none());
    }
}
