//! Mock sender for testing
//!
//! Records every message in an in-memory outbox. Recipients added with
//! `fail_for` get an error instead, which is how tests exercise per-item
//! failure handling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{reminder_message, test_message, DeliveryId, EmailMessage, EmailSender};
use crate::error::{Error, Result};
use crate::models::ReminderContent;

/// A message the mock accepted
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub id: DeliveryId,
    pub message: EmailMessage,
    /// Due date for reminders, None for test emails
    pub due: Option<NaiveDate>,
}

#[derive(Default)]
struct MockState {
    outbox: Vec<SentEmail>,
    failing: HashSet<String>,
}

/// Mock email sender
#[derive(Clone, Default)]
pub struct MockMailer {
    state: Arc<Mutex<MockState>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail
    pub fn fail_for(&self, recipient: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(recipient.to_string());
        }
    }

    /// Everything sent so far, in order
    pub fn sent(&self) -> Vec<SentEmail> {
        self.state
            .lock()
            .map(|s| s.outbox.clone())
            .unwrap_or_default()
    }

    fn record(&self, message: EmailMessage, due: Option<NaiveDate>) -> Result<DeliveryId> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Email("mock outbox poisoned".into()))?;

        if state.failing.contains(&message.to) {
            return Err(Error::Email(format!("delivery to {} refused", message.to)));
        }

        let id = format!("mock-{}", state.outbox.len() + 1);
        state.outbox.push(SentEmail {
            id: id.clone(),
            message,
            due,
        });
        Ok(id)
    }
}

#[async_trait]
impl EmailSender for MockMailer {
    async fn send_reminder(
        &self,
        to: &str,
        content: &ReminderContent,
        due: NaiveDate,
    ) -> Result<DeliveryId> {
        self.record(reminder_message(to, content, due), Some(due))
    }

    async fn send_test(&self, to: &str) -> Result<DeliveryId> {
        self.record(test_message(to), None)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_and_failures() {
        let mailer = MockMailer::new();
        mailer.fail_for("broken@example.com");

        let id = mailer.send_test("ok@example.com").await.unwrap();
        assert_eq!(id, "mock-1");
        assert!(mailer.send_test("broken@example.com").await.is_err());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.to, "ok@example.com");
        assert!(sent[0].due.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_outbox() {
        let mailer = MockMailer::new();
        let clone = mailer.clone();
        let due = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        clone
            .send_reminder("a@example.com", &ReminderContent::sample(), due)
            .await
            .unwrap();
        assert_eq!(mailer.sent()[0].due, Some(due));
    }
}
