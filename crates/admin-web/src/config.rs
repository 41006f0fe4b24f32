//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Admin backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Bot token for notifying students about review decisions.
    /// Without it decisions are recorded but nobody is messaged.
    pub bot_token: Option<String>,
    /// Reminder offsets used when seeding rows for new schedules.
    pub reminder_days: Vec<i64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:paytrack.db?mode=rwc` |
    /// | `BOT_TOKEN` | Telegram bot token | (optional) |
    /// | `REMINDER_DAYS` | Reminder offsets in days | `30,15,7,3,0` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:paytrack.db?mode=rwc".to_string());

        let bot_token = env::var("BOT_TOKEN").ok();

        let reminder_days = match env::var("REMINDER_DAYS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().parse::<i64>().map_err(|_| ConfigError::InvalidReminderDays))
                .collect::<Result<_, _>>()?,
            Err(_) => workflow::config::DEFAULT_REMINDER_DAYS.to_vec(),
        };

        Ok(Self {
            addr,
            database_url,
            bot_token,
            reminder_days,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("Invalid REMINDER_DAYS format")]
    InvalidReminderDays,
}
