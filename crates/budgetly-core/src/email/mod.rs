//! Pluggable email senders
//!
//! - `EmailSender` trait: what the reminder dispatcher and test endpoint need
//! - `Mailer` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Sender implementations: `HttpMailer`, `LogMailer`, `MockMailer`
//!
//! Message rendering lives here so every sender delivers identical content.

mod http;
mod log;
mod mock;

pub use http::HttpMailer;
pub use log::LogMailer;
pub use mock::{MockMailer, SentEmail};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{MailBackend, MailConfig};
use crate::error::{Error, Result};
use crate::models::ReminderContent;

/// Identifier the transport assigned to a delivered message
pub type DeliveryId = String;

/// Trait defining the interface for all email senders
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a recurring-transaction reminder due on `due`
    async fn send_reminder(
        &self,
        to: &str,
        content: &ReminderContent,
        due: NaiveDate,
    ) -> Result<DeliveryId>;

    /// Send a plain "configuration works" email
    async fn send_test(&self, to: &str) -> Result<DeliveryId>;

    /// Sender name (for logging)
    fn name(&self) -> &str;
}

/// A rendered email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render a reminder email
pub fn reminder_message(to: &str, content: &ReminderContent, due: NaiveDate) -> EmailMessage {
    let due_str = due.format("%A, %B %-d, %Y").to_string();
    let amount = format!("${:.2}", content.amount);
    let category = content.category.as_deref().unwrap_or("Uncategorized");

    let mut rows = vec![
        ("Transaction", content.name.clone()),
        ("Amount", amount.clone()),
        ("Category", category.to_string()),
        ("Frequency", capitalize(content.recurring.as_str())),
    ];
    if let Some(budget) = &content.budget_name {
        rows.push(("Budget", budget.clone()));
    }
    rows.push(("Due date", due_str.clone()));

    let text_rows: String = rows
        .iter()
        .map(|(label, value)| format!("{}: {}\n", label, value))
        .collect();
    let html_rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td style=\"padding:4px 12px 4px 0;color:#666\">{}</td><td style=\"padding:4px 0\"><strong>{}</strong></td></tr>",
                label,
                escape_html(value)
            )
        })
        .collect();

    EmailMessage {
        to: to.to_string(),
        subject: format!("Reminder: {} ({}) is due {}", content.name, amount, due_str),
        text: format!(
            "Hi,\n\nYour recurring transaction is due.\n\n{}\nLog it in Budgetly once it has been paid.\n",
            text_rows
        ),
        html: format!(
            "<div style=\"font-family:sans-serif\"><h2>Recurring transaction due</h2><table>{}</table><p>Log it in Budgetly once it has been paid.</p></div>",
            html_rows
        ),
    }
}

/// Render the test email
pub fn test_message(to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Budgetly test email".to_string(),
        text: "Email delivery is configured correctly. Recurring transaction reminders will arrive at this address.\n".to_string(),
        html: "<div style=\"font-family:sans-serif\"><h2>It works</h2><p>Email delivery is configured correctly. Recurring transaction reminders will arrive at this address.</p></div>".to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Concrete email sender enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum Mailer {
    /// Transactional mail relay over HTTP
    Http(HttpMailer),
    /// Writes messages to the log (development)
    Log(LogMailer),
    /// In-memory outbox for testing
    Mock(MockMailer),
}

impl Mailer {
    /// Build the sender selected by configuration
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        match config.backend {
            MailBackend::Http => {
                let url = config.api_url.as_deref().ok_or_else(|| {
                    Error::Config("mail relay URL is required for the http mail backend".into())
                })?;
                Ok(Mailer::Http(HttpMailer::new(
                    url,
                    config.api_key.as_deref(),
                    &config.from,
                    config.timeout_secs,
                )?))
            }
            MailBackend::Log => Ok(Mailer::Log(LogMailer::new())),
            MailBackend::Mock => Ok(Mailer::Mock(MockMailer::new())),
        }
    }

    /// Create a mock sender for testing
    pub fn mock() -> Self {
        Mailer::Mock(MockMailer::new())
    }
}

#[async_trait]
impl EmailSender for Mailer {
    async fn send_reminder(
        &self,
        to: &str,
        content: &ReminderContent,
        due: NaiveDate,
    ) -> Result<DeliveryId> {
        match self {
            Mailer::Http(m) => m.send_reminder(to, content, due).await,
            Mailer::Log(m) => m.send_reminder(to, content, due).await,
            Mailer::Mock(m) => m.send_reminder(to, content, due).await,
        }
    }

    async fn send_test(&self, to: &str) -> Result<DeliveryId> {
        match self {
            Mailer::Http(m) => m.send_test(to).await,
            Mailer::Log(m) => m.send_test(to).await,
            Mailer::Mock(m) => m.send_test(to).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Mailer::Http(m) => m.name(),
            Mailer::Log(m) => m.name(),
            Mailer::Mock(m) => m.name(),
        }
    }
}
