//! JSON admin backend for the payment tracking bot.
//!
//! Serves statistics, student/group/schedule management and receipt
//! review over HTTP. Review decisions notify students through the same
//! transport as the bot when a token is configured.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use telegram_api::{BotConfig, TelegramClient};
use tracing::{info, warn};
use workflow::{MessageSender, NoOpSender, TelegramSender};

use crate::config::Config;
use crate::state::AppState;

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

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting admin backend");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let sender: Arc<dyn MessageSender> = match &config.bot_token {
        Some(token) => {
            let client = TelegramClient::connect(BotConfig::new(token)).await?;
            Arc::new(TelegramSender::new(client))
        }
        None => {
            warn!("BOT_TOKEN not set; review decisions will not notify students");
            Arc::new(NoOpSender)
        }
    };

    let state = AppState::new(db, config.reminder_days.clone(), sender);
    let app = routes::router().with_state(state);

    info!(addr = %config.addr, "Admin backend listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
