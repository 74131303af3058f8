//! Sender that writes messages to the log instead of delivering them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use super::{reminder_message, test_message, DeliveryId, EmailMessage, EmailSender};
use crate::error::Result;
use crate::models::ReminderContent;

/// Development sender: every message "succeeds" and is logged
#[derive(Clone, Default)]
pub struct LogMailer {
    counter: Arc<AtomicU64>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, message: &EmailMessage) -> DeliveryId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("log-{}", n);
        info!(id = %id, to = %message.to, subject = %message.subject, "Email (not delivered)");
        id
    }
}

#[async_trait]
impl EmailSender for LogMailer {
    async fn send_reminder(
        &self,
        to: &str,
        content: &ReminderContent,
        due: NaiveDate,
    ) -> Result<DeliveryId> {
        Ok(self.log(&reminder_message(to, content, due)))
    }

    async fn send_test(&self, to: &str) -> Result<DeliveryId> {
        Ok(self.log(&test_message(to)))
    }

    fn name(&self) -> &str {
        "log"
    }
}
