//! Runtime settings shared by the bot and the admin backend.

use chrono::{FixedOffset, NaiveDate, Utc};

use crate::error::WorkflowError;

/// Default reminder offsets in days before the due date.
pub const DEFAULT_REMINDER_DAYS: &[i64] = &[30, 15, 7, 3, 0];

/// Default accepted receipt MIME types.
pub const DEFAULT_ALLOWED_FILE_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Settings loaded from environment variables.
///
/// | Variable             | Default                              | Description                                  |
/// |----------------------|--------------------------------------|----------------------------------------------|
/// | `BOT_TOKEN`          | (required)                           | Telegram bot token                           |
/// | `DATABASE_URL`       | `sqlite:paytrack.db?mode=rwc`        | SQLite database URL                          |
/// | `ADMIN_IDS`          | (empty)                              | Comma-separated Telegram chat IDs of admins  |
/// | `REMINDER_DAYS`      | `30,15,7,3,0`                        | Reminder offsets in days before due date     |
/// | `ALLOWED_FILE_TYPES` | `image/jpeg,image/png,application/pdf` | Accepted receipt MIME types                |
/// | `MAX_FILE_SIZE_MB`   | `10`                                 | Maximum receipt file size in megabytes       |
/// | `TZ_OFFSET_HOURS`    | `5`                                  | Local timezone offset from UTC (Tashkent)    |
/// | `REMINDER_HOUR`      | `9`                                  | Local hour of the daily reminder sweep       |
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub database_url: String,
    pub admin_ids: Vec<i64>,
    pub reminder_days: Vec<i64>,
    pub allowed_file_types: Vec<String>,
    pub max_file_size: i64,
    pub tz_offset_hours: i32,
    pub reminder_hour: u32,
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self, WorkflowError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| WorkflowError::Config("BOT_TOKEN is not set".to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:paytrack.db?mode=rwc".to_string());

        let admin_ids = parse_id_list(&std::env::var("ADMIN_IDS").unwrap_or_default())?;

        let reminder_days = match std::env::var("REMINDER_DAYS") {
            Ok(raw) => parse_day_list(&raw)?,
            Err(_) => DEFAULT_REMINDER_DAYS.to_vec(),
        };

        let allowed_file_types = match std::env::var("ALLOWED_FILE_TYPES") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_ALLOWED_FILE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let max_file_size_mb: i64 = std::env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| WorkflowError::Config("MAX_FILE_SIZE_MB must be a number".to_string()))?;

        let tz_offset_hours: i32 = std::env::var("TZ_OFFSET_HOURS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| WorkflowError::Config("TZ_OFFSET_HOURS must be a number".to_string()))?;

        let reminder_hour: u32 = std::env::var("REMINDER_HOUR")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .map_err(|_| WorkflowError::Config("REMINDER_HOUR must be an hour (0-23)".to_string()))?;
        if reminder_hour > 23 {
            return Err(WorkflowError::Config(
                "REMINDER_HOUR must be an hour (0-23)".to_string(),
            ));
        }

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            reminder_days,
            allowed_file_types,
            max_file_size: max_file_size_mb * 1024 * 1024,
            tz_offset_hours,
            reminder_hour,
        })
    }

    /// Today's date in the configured local timezone.
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.local_offset()).date_naive()
    }

    /// Current hour in the configured local timezone.
    pub fn local_hour(&self) -> u32 {
        use chrono::Timelike;
        Utc::now().with_timezone(&self.local_offset()).hour()
    }

    fn local_offset(&self) -> FixedOffset {
        use chrono::Offset;
        FixedOffset::east_opt(self.tz_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// Whether a MIME type is accepted for receipt files.
    pub fn is_allowed_file_type(&self, mime: &str) -> bool {
        self.allowed_file_types.iter().any(|t| t == mime)
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, WorkflowError> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| WorkflowError::Config(format!("Invalid chat ID in ADMIN_IDS: {}", s)))
        })
        .collect()
}

fn parse_day_list(raw: &str) -> Result<Vec<i64>, WorkflowError> {
    let mut days: Vec<i64> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().ok().filter(|d| *d >= 0).ok_or_else(|| {
                WorkflowError::Config(format!("Invalid offset in REMINDER_DAYS: {}", s))
            })
        })
        .collect::<Result<_, _>>()?;
    days.sort_unstable();
    days.dedup();
    days.reverse();
    if days.is_empty() {
        return Err(WorkflowError::Config(
            "REMINDER_DAYS must contain at least one offset".to_string(),
        ));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_id_list("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("1,abc").is_err());
    }

    #[test]
    fn test_parse_day_list_sorted_descending() {
        assert_eq!(parse_day_list("3,30,0,15,7").unwrap(), vec![30, 15, 7, 3, 0]);
        assert_eq!(parse_day_list("7,7,7").unwrap(), vec![7]);
        assert!(parse_day_list("").is_err());
        assert!(parse_day_list("-5").is_err());
    }

    #[test]
    fn test_allowed_file_type() {
        let settings = Settings {
            bot_token: "t".to_string(),
            database_url: "sqlite::memory:".to_string(),
            admin_ids: vec![],
            reminder_days: DEFAULT_REMINDER_DAYS.to_vec(),
            allowed_file_types: DEFAULT_ALLOWED_FILE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024,
            tz_offset_hours: 5,
            reminder_hour: 9,
        };
        assert!(settings.is_allowed_file_type("application/pdf"));
        assert!(!settings.is_allowed_file_type("video/mp4"));
    }
}
