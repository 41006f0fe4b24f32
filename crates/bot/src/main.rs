//! Telegram bot for collecting payment receipts and sending reminders.

mod router;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use database::Database;
use telegram_api::{BotConfig, TelegramClient};
use tracing::{error, info};
use workflow::{
    AuthContext, InboxService, MessageSender, ReminderService, ReviewService, Settings,
    StaffNotifier, StatsService, SubmissionWorkflow, TelegramSender,
};

use crate::router::BotContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::from_env()?;

    let db = Database::connect(&settings.database_url).await?;
    db.migrate().await?;

    let client = TelegramClient::connect(BotConfig::new(&settings.bot_token)).await?;
    let sender: Arc<dyn MessageSender> = Arc::new(TelegramSender::new(client.clone()));

    let notifier = StaffNotifier::new(db.clone(), settings.admin_ids.clone());
    let submission = Arc::new(SubmissionWorkflow::new(
        db.clone(),
        notifier.clone(),
        settings.allowed_file_types.clone(),
        settings.max_file_size,
    ));
    let reminders = ReminderService::new(db.clone(), settings.reminder_days.clone());

    let ctx = Arc::new(BotContext::new(
        db.clone(),
        client.clone(),
        sender.clone(),
        submission,
        ReviewService::new(db.clone()),
        StatsService::new(db.clone()),
        InboxService::new(db.clone(), notifier),
        AuthContext::new(db.clone(), settings.admin_ids.clone()),
    ));

    let sweep = scheduler::spawn_reminder_sweep(reminders, settings, sender);

    info!("Bot started, polling for updates");
    let poll = tokio::spawn(async move {
        loop {
            match ctx.client.get_updates().await {
                Ok(updates) => {
                    for update in updates {
                        router::handle_update(&ctx, update).await;
                    }
                }
                Err(e) => {
                    error!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    poll.abort();
    sweep.abort();
    db.close().await;

    Ok(())
}
