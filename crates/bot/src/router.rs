//! Update routing: commands, conversation input and button presses.

use std::collections::HashMap;
use std::sync::Arc;

use database::{group, schedule, student, Database, ReceiptStatus};
use telegram_api::{CallbackQuery, ChatMemberUpdated, Message, TelegramClient, Update, User};
use tokio::sync::Mutex;
use tracing::{info, warn};
use workflow::{
    texts, AuthContext, IncomingFile, InboxService, MessageSender, Reply, ReplyOutcome,
    ReviewOutcome, ReviewService, StatsService, StoredFile, SubmissionWorkflow, WorkflowError,
};

/// Everything a handler needs, shared across the update loop.
pub struct BotContext {
    pub db: Database,
    pub client: TelegramClient,
    pub sender: Arc<dyn MessageSender>,
    pub submission: Arc<SubmissionWorkflow>,
    pub review: ReviewService,
    pub stats: StatsService,
    pub inbox: InboxService,
    pub auth: AuthContext,
    /// Staff chats that issued /reply_<id> and owe us the reply text.
    pending_replies: Mutex<HashMap<i64, i64>>,
}

impl BotContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Database,
        client: TelegramClient,
        sender: Arc<dyn MessageSender>,
        submission: Arc<SubmissionWorkflow>,
        review: ReviewService,
        stats: StatsService,
        inbox: InboxService,
        auth: AuthContext,
    ) -> Self {
        Self {
            db,
            client,
            sender,
            submission,
            review,
            stats,
            inbox,
            auth,
            pending_replies: Mutex::new(HashMap::new()),
        }
    }
}

/// A parsed slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    Submit,
    Cancel,
    History,
    Schedule,
    Status,
    Stats,
    Reply(i64),
    Unknown,
}

fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    // "/start@botname arg" -> "start"
    let word = text[1..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .split('@')
        .next()
        .unwrap_or("");

    Some(match word {
        "start" => Command::Start,
        "help" => Command::Help,
        "submit" => Command::Submit,
        "cancel" => Command::Cancel,
        "history" => Command::History,
        "schedule" => Command::Schedule,
        "status" => Command::Status,
        "stats" => Command::Stats,
        _ => match word.strip_prefix("reply_").and_then(|id| id.parse().ok()) {
            Some(id) => Command::Reply(id),
            None => Command::Unknown,
        },
    })
}

/// Dispatch one update. Errors are logged, never fatal to the loop.
pub async fn handle_update(ctx: &BotContext, update: Update) {
    let result = if let Some(message) = update.message {
        handle_message(ctx, message).await
    } else if let Some(callback) = update.callback_query {
        handle_callback(ctx, callback).await
    } else if let Some(member) = update.my_chat_member {
        handle_chat_member(ctx, member).await
    } else {
        Ok(())
    };

    if let Err(e) = result {
        warn!("Failed to handle update: {}", e);
    }
}

async fn send_reply(ctx: &BotContext, chat_id: i64, reply: Reply) -> Result<(), WorkflowError> {
    if reply.buttons.is_empty() {
        ctx.sender.send_text(chat_id, &reply.text).await
    } else {
        ctx.sender
            .send_text_with_buttons(chat_id, &reply.text, &reply.buttons)
            .await
    }
}

async fn handle_message(ctx: &BotContext, message: Message) -> Result<(), WorkflowError> {
    // Group chats are only bound or released via my_chat_member updates.
    if !message.is_private() {
        return Ok(());
    }
    let chat_id = message.chat.id;

    if let Some(file) = extract_file(&message) {
        if let Some(reply) = ctx.submission.handle_file(chat_id, file).await? {
            send_reply(ctx, chat_id, reply).await?;
        }
        return Ok(());
    }

    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };

    if let Some(command) = parse_command(text) {
        return handle_command(ctx, chat_id, command).await;
    }

    // Mid-conversation answer?
    if let Some(reply) = ctx.submission.handle_text(chat_id, text).await? {
        return send_reply(ctx, chat_id, reply).await;
    }

    // Staff finishing a /reply_<id>?
    if let Some(message_id) = ctx.pending_replies.lock().await.remove(&chat_id) {
        let staff_name = message
            .from
            .as_ref()
            .map(User::display_name)
            .unwrap_or_else(|| "Xodim".to_string());
        let outcome = ctx
            .inbox
            .reply(message_id, text, &staff_name, ctx.sender.as_ref())
            .await?;
        let ack = match outcome {
            ReplyOutcome::Delivered => "✅ Javob yuborildi.",
            ReplyOutcome::AlreadyReplied => "⚠️ Bu savolga allaqachon javob berilgan.",
            ReplyOutcome::NotFound => "❌ Savol topilmadi.",
        };
        return ctx.sender.send_text(chat_id, ack).await;
    }

    // Anything else from a student is an anonymous question.
    let ack = ctx
        .inbox
        .submit_question(chat_id, text, ctx.sender.as_ref())
        .await?;
    ctx.sender.send_text(chat_id, &ack).await
}

async fn handle_command(
    ctx: &BotContext,
    chat_id: i64,
    command: Command,
) -> Result<(), WorkflowError> {
    match command {
        Command::Start => ctx.sender.send_text(chat_id, texts::WELCOME).await,
        Command::Help | Command::Unknown => ctx.sender.send_text(chat_id, texts::HELP).await,
        Command::Submit => {
            let reply = ctx.submission.start(chat_id).await?;
            send_reply(ctx, chat_id, reply).await
        }
        Command::Cancel => {
            ctx.pending_replies.lock().await.remove(&chat_id);
            match ctx.submission.cancel(chat_id).await {
                Some(reply) => send_reply(ctx, chat_id, reply).await,
                None => ctx.sender.send_text(chat_id, texts::HELP).await,
            }
        }
        Command::History => {
            let text = match student::get_by_chat_id(ctx.db.pool(), chat_id).await? {
                Some(s) => texts::payment_history(&ctx.stats.student_history(s.id).await?),
                None => "❌ Sizning ma'lumotlaringiz topilmadi!".to_string(),
            };
            ctx.sender.send_text(chat_id, &text).await
        }
        Command::Schedule => {
            let schedules = schedule::list_active(ctx.db.pool()).await?;
            ctx.sender
                .send_text(chat_id, &texts::schedule_list(&schedules))
                .await
        }
        Command::Status => {
            let text = payment_status_text(ctx, chat_id).await?;
            ctx.sender.send_text(chat_id, &text).await
        }
        Command::Stats => {
            if ctx.auth.can_review(chat_id).await? {
                let text = stats_text(ctx).await?;
                ctx.sender.send_text(chat_id, &text).await
            } else {
                ctx.sender.send_text(chat_id, texts::NOT_AUTHORIZED).await
            }
        }
        Command::Reply(message_id) => {
            if ctx.auth.can_review(chat_id).await? {
                ctx.pending_replies.lock().await.insert(chat_id, message_id);
                ctx.sender
                    .send_text(chat_id, "✍️ Javob matnini yuboring:")
                    .await
            } else {
                ctx.sender.send_text(chat_id, texts::NOT_AUTHORIZED).await
            }
        }
    }
}

/// Per-stage payment state for the asking student.
async fn payment_status_text(ctx: &BotContext, chat_id: i64) -> Result<String, WorkflowError> {
    let Some(s) = student::get_by_chat_id(ctx.db.pool(), chat_id).await? else {
        return Ok("❌ Sizning ma'lumotlaringiz topilmadi!".to_string());
    };

    let schedules = schedule::list_active(ctx.db.pool()).await?;
    if schedules.is_empty() {
        return Ok("To'lov jadvali hali e'lon qilinmagan.".to_string());
    }

    let history = ctx.stats.student_history(s.id).await?;
    let mut text = String::from("📊 To'lov holati\n\n");
    for sched in &schedules {
        let line = match history.iter().find(|(r, _)| r.schedule_id == sched.id) {
            Some((r, _)) => match r.status {
                ReceiptStatus::Approved => format!("✅ {} — to'langan", sched.stage.label()),
                ReceiptStatus::Pending => {
                    format!("⏳ {} — tekshirilmoqda", sched.stage.label())
                }
                ReceiptStatus::Rejected => {
                    format!("❌ {} — rad etilgan, qayta yuboring", sched.stage.label())
                }
            },
            None => format!(
                "❗ {} — topshirilmagan (muddat: {})",
                sched.stage.label(),
                texts::format_date(sched.due_date)
            ),
        };
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}

/// Staff statistics: dashboard counters plus per-schedule progress.
async fn stats_text(ctx: &BotContext) -> Result<String, WorkflowError> {
    let dashboard = ctx.stats.dashboard().await?;
    let mut text = format!(
        "📊 Statistika\n\n\
         👥 Faol talabalar: {}\n\
         👥 Faol guruhlar: {}\n\
         ⏳ Kutilayotgan cheklar: {}\n\
         ✅ Tasdiqlangan: {}\n\
         ❌ Rad etilgan: {}\n",
        dashboard.active_students,
        dashboard.active_groups,
        dashboard.pending_receipts,
        dashboard.approved_receipts,
        dashboard.rejected_receipts
    );

    for b in ctx.stats.all_breakdowns().await? {
        text.push_str(&format!(
            "\n📌 {} ({}):\n   topshirildi {}, tasdiqlandi {}, kutmoqda {}, rad {}, topshirmagan {}\n",
            b.schedule.stage.label(),
            texts::format_date(b.schedule.due_date),
            b.submitted,
            b.approved,
            b.pending,
            b.rejected,
            b.missing
        ));
    }
    Ok(text)
}

fn extract_file(message: &Message) -> Option<IncomingFile> {
    if let Some(doc) = &message.document {
        return Some(IncomingFile {
            file: StoredFile::document(&doc.file_id),
            mime_type: doc.mime_type.clone(),
            file_size: doc.file_size,
        });
    }
    message.largest_photo().map(|photo| IncomingFile {
        file: StoredFile::photo(&photo.file_id),
        mime_type: None,
        file_size: photo.file_size,
    })
}

async fn handle_callback(ctx: &BotContext, callback: CallbackQuery) -> Result<(), WorkflowError> {
    let chat_id = callback.from.id;
    let reviewer = callback.from.display_name();
    let Some(data) = callback.data.as_deref() else {
        ctx.client.answer_callback(&callback.id, None).await?;
        return Ok(());
    };

    let toast: Option<String> = if let Some(label) = data.strip_prefix("stage_") {
        let reply = ctx.submission.handle_stage(chat_id, label).await?;
        send_reply(ctx, chat_id, reply).await?;
        None
    } else if data == "confirm_receipt" {
        let reply = ctx.submission.confirm(chat_id, ctx.sender.as_ref()).await?;
        let submitted = reply.text == texts::SUBMITTED;
        send_reply(ctx, chat_id, reply).await?;
        submitted.then(|| "✅ Muvaffaqiyatli!".to_string())
    } else if data == "cancel_receipt" {
        if let Some(reply) = ctx.submission.cancel(chat_id).await {
            send_reply(ctx, chat_id, reply).await?;
        }
        None
    } else if let Some(id) = data.strip_prefix("approve_receipt_") {
        review_toast(ctx, chat_id, id, true, &reviewer).await?
    } else if let Some(id) = data.strip_prefix("reject_receipt_") {
        review_toast(ctx, chat_id, id, false, &reviewer).await?
    } else {
        None
    };

    ctx.client.answer_callback(&callback.id, toast).await?;
    Ok(())
}

async fn review_toast(
    ctx: &BotContext,
    chat_id: i64,
    id: &str,
    approve: bool,
    reviewer: &str,
) -> Result<Option<String>, WorkflowError> {
    if !ctx.auth.can_review(chat_id).await? {
        return Ok(Some(texts::NOT_AUTHORIZED.to_string()));
    }
    let Ok(receipt_id) = id.parse::<i64>() else {
        return Ok(Some("❌ Xatolik!".to_string()));
    };

    let outcome = if approve {
        ctx.review
            .approve(receipt_id, reviewer, ctx.sender.as_ref())
            .await?
    } else {
        ctx.review
            .reject(receipt_id, reviewer, "", ctx.sender.as_ref())
            .await?
    };

    Ok(Some(match (outcome, approve) {
        (ReviewOutcome::Recorded, true) => "✅ Tasdiqlandi!".to_string(),
        (ReviewOutcome::Recorded, false) => "❌ Rad etildi!".to_string(),
        (ReviewOutcome::AlreadyReviewed, _) => "⚠️ Allaqachon ko'rib chiqilgan.".to_string(),
    }))
}

/// Track the bot being added to or removed from group chats.
async fn handle_chat_member(ctx: &BotContext, member: ChatMemberUpdated) -> Result<(), WorkflowError> {
    use telegram_api::ChatKind;
    if !matches!(member.chat.kind, ChatKind::Group | ChatKind::Supergroup) {
        return Ok(());
    }

    let title = member.chat.title.as_deref().unwrap_or("Guruh");
    if member.new_chat_member.status.is_present() {
        // Only an admin may attach the bot to a group chat.
        if !matches!(
            ctx.auth.role_for(member.from.id).await?,
            Some(database::StaffRole::Admin)
        ) {
            warn!(
                "Non-admin {} added bot to chat {}, leaving",
                member.from.id, member.chat.id
            );
            ctx.sender
                .send_text(member.chat.id, texts::GROUP_NOT_ALLOWED)
                .await?;
            ctx.client.leave_chat(member.chat.id).await?;
            return Ok(());
        }
        let bound = group::upsert_chat_binding(ctx.db.pool(), member.chat.id, title).await?;
        info!("Bound group '{}' to chat {}", bound.name, member.chat.id);
    } else if group::deactivate_by_chat(ctx.db.pool(), member.chat.id).await? {
        info!("Released group chat {}", member.chat.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/submit@paytrack_bot"), Some(Command::Submit));
        assert_eq!(parse_command("  /help  "), Some(Command::Help));
        assert_eq!(parse_command("/reply_17"), Some(Command::Reply(17)));
        assert_eq!(parse_command("/reply_abc"), Some(Command::Unknown));
        assert_eq!(parse_command("/frobnicate"), Some(Command::Unknown));
        assert_eq!(parse_command("salom"), None);
    }
}
