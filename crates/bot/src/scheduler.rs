//! Periodic reminder sweeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};
use workflow::{MessageSender, ReminderService, Settings};

/// How often the sweep re-checks for due reminders.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawn the hourly reminder sweep.
///
/// The sweep itself is idempotent, so the schedule only controls latency:
/// each reminder fires within an hour of becoming due. Sweeps are held
/// back until the configured morning hour so nobody is pinged at night.
pub fn spawn_reminder_sweep(
    service: ReminderService,
    settings: Settings,
    sender: Arc<dyn MessageSender>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if settings.local_hour() < settings.reminder_hour {
                continue;
            }

            match service
                .check_and_send(settings.local_today(), sender.as_ref())
                .await
            {
                Ok(sweep) if sweep.delivered > 0 || sweep.generated > 0 => {
                    info!(
                        "Reminder sweep done: {} generated, {} delivered",
                        sweep.generated, sweep.delivered
                    );
                }
                Ok(_) => {}
                Err(e) => error!("Reminder sweep failed: {}", e),
            }
        }
    })
}
