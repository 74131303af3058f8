//! Recurring-transaction reminder scan and dispatch
//!
//! The scan selects recurring transactions whose next due date falls on or
//! before the end of today (in the configured zone) and which have not been
//! reminded today. The dispatcher emails each candidate and records
//! `last_reminder_sent` only after a successful send, so a failed item is
//! picked up again by the next run.
//!
//! Same-day idempotence comes entirely from the scan. Two runs that overlap
//! may both send; nothing claims a row before the email goes out.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, warn};

use crate::clock::{end_of_day, is_today_at, local_date};
use crate::db::ReminderStore;
use crate::email::EmailSender;
use crate::error::Result;
use crate::models::{DispatchSummary, DueReminder, ReminderEvent};

/// Reminders due by the end of `now`'s day that were not already sent today
///
/// Ordered by transaction id. Read-only.
pub fn find_due_reminders(
    store: &dyn ReminderStore,
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> Result<Vec<DueReminder>> {
    let due_by = end_of_day(now, tz);
    let candidates = store.reminder_candidates(due_by)?;
    let total = candidates.len();

    let due: Vec<DueReminder> = candidates
        .into_iter()
        .filter(|c| c.recurring.is_recurring())
        .filter(|c| match c.last_reminder_sent {
            Some(sent) => !is_today_at(sent, now, tz),
            None => true,
        })
        .collect();

    debug!(
        candidates = total,
        due = due.len(),
        due_by = %due_by,
        "Reminder scan complete"
    );

    Ok(due)
}

/// Sends reminder emails for everything the scan returns
pub struct ReminderDispatcher<'a> {
    store: &'a dyn ReminderStore,
    mailer: &'a dyn EmailSender,
    tz: FixedOffset,
}

impl<'a> ReminderDispatcher<'a> {
    pub fn new(store: &'a dyn ReminderStore, mailer: &'a dyn EmailSender, tz: FixedOffset) -> Self {
        Self { store, mailer, tz }
    }

    /// Run one dispatch pass at `now`
    ///
    /// Email failures are recorded per item and do not stop the run. A failure
    /// to record a successful send aborts the run and is returned.
    pub async fn dispatch(&self, now: DateTime<Utc>) -> Result<DispatchSummary> {
        let due = find_due_reminders(self.store, now, &self.tz)?;
        let total_due = due.len();

        info!(
            total_due,
            mailer = self.mailer.name(),
            "Dispatching recurring transaction reminders"
        );

        let mut results = Vec::with_capacity(total_due);
        for reminder in &due {
            let due_date = local_date(reminder.next_due_date, &self.tz);
            let sent = self
                .mailer
                .send_reminder(&reminder.user_email, &reminder.content(), due_date)
                .await;

            match sent {
                Ok(message_id) => {
                    self.store
                        .mark_reminder_sent(reminder.transaction_id, now)?;
                    info!(
                        transaction_id = reminder.transaction_id,
                        to = %reminder.user_email,
                        message_id = %message_id,
                        "Reminder sent"
                    );
                    results.push(ReminderEvent::sent(
                        reminder.transaction_id,
                        &reminder.user_email,
                        message_id,
                    ));
                }
                Err(e) => {
                    warn!(
                        transaction_id = reminder.transaction_id,
                        to = %reminder.user_email,
                        "Reminder failed: {}",
                        e
                    );
                    results.push(ReminderEvent::failed(
                        reminder.transaction_id,
                        &reminder.user_email,
                        e.to_string(),
                    ));
                }
            }
        }

        let summary = DispatchSummary {
            processed_count: results.len(),
            total_due,
            results,
        };

        info!(
            processed = summary.processed_count,
            sent = summary.sent_count(),
            failed = summary.failed_count(),
            "Reminder dispatch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::email::MockMailer;
    use crate::error::Error;
    use crate::models::{NewBudget, NewTransaction, Recurrence, ReminderOutcome};
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Mutex;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn budget(db: &Database, owner: &str) -> i64 {
        db.create_budget(&NewBudget {
            name: "Bills".to_string(),
            amount: 2000.0,
            created_by: owner.to_string(),
            category: None,
            icon: None,
        })
        .unwrap()
        .id
    }

    fn recurring_tx(db: &Database, budget_id: i64, name: &str, created: DateTime<Utc>) -> i64 {
        db.create_transaction(
            &NewTransaction {
                name: name.to_string(),
                amount: 1200.0,
                budget_id,
                category: Some("Housing".to_string()),
                recurring: Recurrence::Monthly,
            },
            created,
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_monthly_reminder_due_today_is_sent() {
        let db = Database::in_memory().unwrap();
        let b = budget(&db, "alice@example.com");
        // Created a month earlier, so it is due 2024-01-15 09:00
        let id = recurring_tx(&db, b, "Rent", at(2023, 12, 15, 9));

        let mailer = MockMailer::new();
        let now = at(2024, 1, 15, 10);
        let summary = ReminderDispatcher::new(&db, &mailer, utc())
            .dispatch(now)
            .await
            .unwrap();

        assert_eq!(summary.total_due, 1);
        assert_eq!(summary.processed_count, 1);
        assert_eq!(summary.results[0].status, ReminderOutcome::Sent);
        assert_eq!(summary.results[0].transaction_id, id);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.to, "alice@example.com");
        assert_eq!(sent[0].due, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(
            summary.results[0].message_id.as_deref(),
            Some(sent[0].id.as_str())
        );

        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.last_reminder_sent, Some(now));
    }

    #[tokio::test]
    async fn test_second_run_same_day_selects_nothing() {
        let db = Database::in_memory().unwrap();
        let b = budget(&db, "alice@example.com");
        recurring_tx(&db, b, "Rent", at(2023, 12, 15, 9));

        let mailer = MockMailer::new();
        let dispatcher = ReminderDispatcher::new(&db, &mailer, utc());
        let now = at(2024, 1, 15, 10);

        let first = dispatcher.dispatch(now).await.unwrap();
        assert_eq!(first.sent_count(), 1);

        let second = dispatcher.dispatch(now).await.unwrap();
        assert_eq!(second.total_due, 0);
        assert!(second.results.is_empty());
        assert_eq!(mailer.sent().len(), 1);

        // Later the same day is still "today"
        let third = dispatcher.dispatch(at(2024, 1, 15, 23)).await.unwrap();
        assert_eq!(third.total_due, 0);

        // next_due_date is not advanced, so the reminder repeats tomorrow
        let tomorrow = dispatcher.dispatch(at(2024, 1, 16, 8)).await.unwrap();
        assert_eq!(tomorrow.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_reminders() {
        let db = Database::in_memory().unwrap();
        let a = recurring_tx(&db, budget(&db, "a@example.com"), "Gym", at(2023, 12, 15, 9));
        let b = recurring_tx(&db, budget(&db, "b@example.com"), "Rent", at(2023, 12, 15, 9));

        let mailer = MockMailer::new();
        mailer.fail_for("a@example.com");

        let summary = ReminderDispatcher::new(&db, &mailer, utc())
            .dispatch(at(2024, 1, 15, 10))
            .await
            .unwrap();

        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.results[0].transaction_id, a);
        assert_eq!(summary.results[0].status, ReminderOutcome::Failed);
        assert!(summary.results[0].error.is_some());
        assert_eq!(summary.results[1].transaction_id, b);
        assert_eq!(summary.results[1].status, ReminderOutcome::Sent);

        assert!(db.get_transaction(a).unwrap().unwrap().last_reminder_sent.is_none());
        assert!(db.get_transaction(b).unwrap().unwrap().last_reminder_sent.is_some());
    }

    #[tokio::test]
    async fn test_future_reminders_are_not_sent() {
        let db = Database::in_memory().unwrap();
        let b = budget(&db, "alice@example.com");
        recurring_tx(&db, b, "Rent", at(2024, 1, 10, 9));

        let mailer = MockMailer::new();
        let summary = ReminderDispatcher::new(&db, &mailer, utc())
            .dispatch(at(2024, 1, 15, 10))
            .await
            .unwrap();
        assert_eq!(summary.total_due, 0);
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn test_due_later_today_counts_as_due() {
        let db = Database::in_memory().unwrap();
        let b = budget(&db, "alice@example.com");
        // Due 2024-01-15 21:00 UTC
        recurring_tx(&db, b, "Rent", at(2023, 12, 15, 21));

        let due = find_due_reminders(&db, at(2024, 1, 15, 8), &utc()).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_today_follows_configured_offset() {
        let db = Database::in_memory().unwrap();
        let b = budget(&db, "alice@example.com");
        // Due 2024-01-16 02:00 UTC, which is still Jan 15 at -05:00
        recurring_tx(&db, b, "Rent", at(2023, 12, 16, 2));

        let now = at(2024, 1, 15, 20);
        assert!(find_due_reminders(&db, now, &utc()).unwrap().is_empty());

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(find_due_reminders(&db, now, &new_york).unwrap().len(), 1);
    }

    /// Store with fixed candidates that records or rejects updates
    struct FakeStore {
        candidates: Vec<DueReminder>,
        fail_marks: bool,
        marked: Mutex<Vec<i64>>,
    }

    impl ReminderStore for FakeStore {
        fn reminder_candidates(&self, _due_by: DateTime<Utc>) -> Result<Vec<DueReminder>> {
            Ok(self.candidates.clone())
        }

        fn mark_reminder_sent(&self, transaction_id: i64, _at: DateTime<Utc>) -> Result<()> {
            if self.fail_marks {
                return Err(Error::NotFound(format!("transaction {}", transaction_id)));
            }
            self.marked.lock().unwrap().push(transaction_id);
            Ok(())
        }
    }

    fn candidate(id: i64, recurring: Recurrence, last: Option<DateTime<Utc>>) -> DueReminder {
        DueReminder {
            transaction_id: id,
            user_email: "owner@example.com".to_string(),
            transaction_name: format!("tx{}", id),
            amount: 10.0,
            category: None,
            recurring,
            budget_name: "Bills".to_string(),
            next_due_date: at(2024, 1, 15, 0),
            last_reminder_sent: last,
        }
    }

    #[test]
    fn test_scan_excludes_none_and_reminded_today() {
        let store = FakeStore {
            candidates: vec![
                candidate(1, Recurrence::Daily, None),
                candidate(2, Recurrence::None, None),
                candidate(3, Recurrence::Weekly, Some(at(2024, 1, 15, 1))),
                candidate(4, Recurrence::Yearly, Some(at(2024, 1, 14, 23))),
            ],
            fail_marks: false,
            marked: Mutex::new(vec![]),
        };

        let due = find_due_reminders(&store, at(2024, 1, 15, 12), &utc()).unwrap();
        let ids: Vec<i64> = due.iter().map(|d| d.transaction_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_persist_failure_aborts_run() {
        let store = FakeStore {
            candidates: vec![
                candidate(1, Recurrence::Monthly, None),
                candidate(2, Recurrence::Monthly, None),
            ],
            fail_marks: true,
            marked: Mutex::new(vec![]),
        };
        let mailer = MockMailer::new();

        let result = ReminderDispatcher::new(&store, &mailer, utc())
            .dispatch(at(2024, 1, 15, 12))
            .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        // The first email went out before the update failed
        assert_eq!(mailer.sent().len(), 1);
    }
}
