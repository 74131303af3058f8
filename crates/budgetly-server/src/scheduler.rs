//! Background task scheduler for reminder dispatch
//!
//! Provides optional in-process scheduling for deployments without an
//! external cron service, enabled by `AppConfig::reminder_interval_hours`
//! (`BUDGETLY_REMINDER_INTERVAL_HOURS`, e.g. "24" for daily).
//!
//! Each tick runs the same dispatcher as `GET /api/cron/reminders`. Running both
//! at once can send a reminder twice.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use budgetly_core::config::MAX_REMINDER_INTERVAL_HOURS;
use budgetly_core::{AppConfig, Clock, ReminderDispatcher};

use crate::AppState;

/// Configuration for scheduled reminder dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderScheduleConfig {
    /// Interval between dispatch runs in hours
    pub interval_hours: u64,
}

impl ReminderScheduleConfig {
    /// Returns None if scheduling is not configured
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .reminder_interval_hours
            .filter(|hours| *hours > 0)
            .map(|interval_hours| Self { interval_hours })
    }

    /// Tick period, capped at [`MAX_REMINDER_INTERVAL_HOURS`]
    pub fn period(&self) -> Duration {
        let hours = self.interval_hours.clamp(1, MAX_REMINDER_INTERVAL_HOURS);
        Duration::from_secs(hours * 3600)
    }
}

/// Start the reminder scheduler as a background task
///
/// This function spawns a tokio task that runs indefinitely, dispatching
/// reminders at the configured interval. Failed runs are logged and the
/// schedule continues.
pub fn start_reminder_scheduler(state: Arc<AppState>, config: ReminderScheduleConfig) {
    info!(
        "Starting reminder scheduler: every {} hours",
        config.interval_hours
    );

    tokio::spawn(async move {
        let mut ticker = interval(config.period());

        // Skip the first immediate tick - don't dispatch on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            info!("Running scheduled reminder dispatch...");
            run_scheduled_dispatch(&state).await;
        }
    });
}

/// Run a single scheduled dispatch
async fn run_scheduled_dispatch(state: &AppState) {
    let dispatcher = ReminderDispatcher::new(&state.db, &state.mailer, state.config.utc_offset);

    match dispatcher.dispatch(state.clock.now()).await {
        Ok(summary) => {
            info!(
                "Scheduled dispatch completed: {} sent, {} failed, {} due",
                summary.sent_count(),
                summary.failed_count(),
                summary.total_due
            );

            // Log to audit (as "scheduler" user)
            if let Err(e) = state.db.log_audit(
                "scheduler",
                "dispatch",
                Some("reminder"),
                None,
                Some(&format!(
                    "sent={}, failed={}, due={}",
                    summary.sent_count(),
                    summary.failed_count(),
                    summary.total_due
                )),
            ) {
                warn!("Failed to log scheduled dispatch to audit: {}", e);
            }
        }
        Err(e) => {
            error!("Scheduled reminder dispatch failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetly_core::models::{NewBudget, NewTransaction, Recurrence};
    use budgetly_core::{AppConfig, Database, FixedClock, Mailer, MockMailer};
    use chrono::{TimeZone, Utc};

    fn with_interval(hours: Option<u64>) -> AppConfig {
        AppConfig {
            reminder_interval_hours: hours,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_config_not_set() {
        assert!(ReminderScheduleConfig::from_config(&AppConfig::default()).is_none());
        assert!(ReminderScheduleConfig::from_config(&with_interval(Some(0))).is_none());
    }

    #[test]
    fn test_config_hours() {
        let schedule = ReminderScheduleConfig::from_config(&with_interval(Some(24))).unwrap();
        assert_eq!(schedule, ReminderScheduleConfig { interval_hours: 24 });
        assert_eq!(schedule.period(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_period_is_capped() {
        let schedule = ReminderScheduleConfig {
            interval_hours: u64::MAX,
        };
        assert_eq!(
            schedule.period(),
            Duration::from_secs(MAX_REMINDER_INTERVAL_HOURS * 3600)
        );
    }

    #[tokio::test]
    async fn test_scheduled_dispatch_sends_and_audits() {
        let db = Database::in_memory().unwrap();
        let budget = db
            .create_budget(&NewBudget {
                name: "Home".into(),
                amount: 1500.0,
                created_by: "alice@example.com".into(),
                category: None,
                icon: None,
            })
            .unwrap();
        db.create_transaction(
            &NewTransaction {
                name: "Rent".into(),
                amount: 1200.0,
                budget_id: budget.id,
                category: None,
                recurring: Recurrence::Monthly,
            },
            Utc.with_ymd_and_hms(2023, 12, 15, 9, 0, 0).unwrap(),
        )
        .unwrap();

        let mailer = MockMailer::new();
        let state = AppState::new(db, AppConfig::default())
            .unwrap()
            .with_mailer(Mailer::Mock(mailer.clone()))
            .with_clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            )));

        run_scheduled_dispatch(&state).await;

        assert_eq!(mailer.sent().len(), 1);
        let audit = state.db.list_audit_log(10).unwrap();
        assert_eq!(audit[0].user_email, "scheduler");
        assert_eq!(audit[0].details.as_deref(), Some("sent=1, failed=0, due=1"));
    }
}
