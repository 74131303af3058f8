//! Transactional mail relay over HTTP
//!
//! POSTs `{from, to, subject, text, html}` as JSON to the configured endpoint
//! and reads the delivery id from the `id` field of the response.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{reminder_message, test_message, DeliveryId, EmailMessage, EmailSender};
use crate::error::{Error, Result};
use crate::models::ReminderContent;

/// HTTP mail relay sender
#[derive(Clone)]
pub struct HttpMailer {
    http_client: Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct RelayResponse {
    id: String,
}

impl HttpMailer {
    /// Create a sender whose requests fail after `timeout_secs`
    pub fn new(url: &str, api_key: Option<&str>, from: &str, timeout_secs: u64) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            url: url.to_string(),
            api_key: api_key.map(str::to_string),
            from: from.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryId> {
        let request = RelayRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: &message.html,
        };

        let mut req_builder = self.http_client.post(&self.url).json(&request);
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Email(format!("mail relay error {}: {}", status, body)));
        }

        let relay_response: RelayResponse = response.json().await?;
        debug!(to = %message.to, id = %relay_response.id, "Mail relay accepted message");
        Ok(relay_response.id)
    }
}

#[async_trait]
impl EmailSender for HttpMailer {
    async fn send_reminder(
        &self,
        to: &str,
        content: &ReminderContent,
        due: NaiveDate,
    ) -> Result<DeliveryId> {
        self.deliver(&reminder_message(to, content, due)).await
    }

    async fn send_test(&self, to: &str) -> Result<DeliveryId> {
        self.deliver(&test_message(to)).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_request_serialization() {
        let request = RelayRequest {
            from: "Budgetly <r@example.com>",
            to: "u@example.com",
            subject: "s",
            text: "t",
            html: "<p>h</p>",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["from"], "Budgetly <r@example.com>");
        assert_eq!(json["to"], "u@example.com");
        assert_eq!(json["html"], "<p>h</p>");
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_error() {
        // Port 9 (discard) is closed on test machines
        let mailer = HttpMailer::new("http://127.0.0.1:9/emails", None, "a@b.c", 2).unwrap();
        assert!(mailer.send_test("u@example.com").await.is_err());
    }
}
