//! Application configuration
//!
//! Built once at startup with [`AppConfig::from_env`] and passed down to the
//! components that need it. Nothing below this module reads the environment.
//!
//! Environment variables:
//! - `BUDGETLY_ADMIN_EMAILS`: Comma-separated admin allowlist
//! - `BUDGETLY_CRON_SECRET`: Bearer secret for the cron trigger (unset = open)
//! - `BUDGETLY_UTC_OFFSET`: Zone used for "today", as `±HH:MM` (default: +00:00)
//! - `BUDGETLY_PAGE_SIZE`: Default transaction page size (default: 10)
//! - `BUDGETLY_REMINDER_INTERVAL_HOURS`: In-process reminder schedule, 1..=8760 (unset or 0 = off)
//! - `BUDGETLY_MAIL_BACKEND`: `http`, `log` or `mock` (default: http when a URL is set)
//! - `BUDGETLY_MAIL_API_URL`: Transactional mail relay endpoint
//! - `BUDGETLY_MAIL_API_KEY`: Bearer key for the relay (optional)
//! - `BUDGETLY_MAIL_FROM`: Sender address
//! - `BUDGETLY_MAIL_TIMEOUT_SECS`: Relay request timeout (default: 10)
//! - `AI_BACKEND`: `openai_compatible` or `mock` (default: openai_compatible)
//! - `OPENAI_COMPATIBLE_HOST`: Chat-completion server URL (required for AI features)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

use crate::error::{Error, Result};

/// Page size used when none is requested or configured
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Longest in-process reminder interval (one year)
pub const MAX_REMINDER_INTERVAL_HOURS: u64 = 24 * 365;

/// Default chat-completion model
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_MAIL_FROM: &str = "Budgetly <reminders@budgetly.app>";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

/// Which email sender to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    Http,
    Log,
    Mock,
}

/// Email sender settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::Log,
            api_url: None,
            api_key: None,
            from: DEFAULT_MAIL_FROM.to_string(),
            timeout_secs: DEFAULT_MAIL_TIMEOUT_SECS,
        }
    }
}

/// AI advisor settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Lowercased `AI_BACKEND` value
    pub backend: String,
    pub host: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Explicit application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Lowercased admin emails
    pub admin_emails: Vec<String>,
    pub cron_secret: Option<String>,
    /// Zone that defines the current calendar day
    pub utc_offset: FixedOffset,
    pub page_size: i64,
    /// None disables the in-process reminder scheduler
    pub reminder_interval_hours: Option<u64>,
    pub mail: MailConfig,
    /// None when no advisor backend is configured
    pub ai: Option<AiConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_emails: vec![],
            cron_secret: None,
            utc_offset: utc(),
            page_size: DEFAULT_PAGE_SIZE,
            reminder_interval_hours: None,
            mail: MailConfig::default(),
            ai: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let admin_emails = get("BUDGETLY_ADMIN_EMAILS")
            .map(|v| parse_email_list(&v))
            .unwrap_or_default();

        let utc_offset = match get("BUDGETLY_UTC_OFFSET") {
            Some(v) => parse_offset(&v)?,
            None => utc(),
        };

        let page_size = match get("BUDGETLY_PAGE_SIZE") {
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| Error::Config(format!("BUDGETLY_PAGE_SIZE is not a number: {}", v)))?
                .clamp(1, MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };

        let reminder_interval_hours = match get("BUDGETLY_REMINDER_INTERVAL_HOURS") {
            Some(v) => parse_interval_hours(&v)?,
            None => None,
        };

        let api_url = get("BUDGETLY_MAIL_API_URL");
        let backend = match get("BUDGETLY_MAIL_BACKEND").map(|v| v.to_lowercase()) {
            Some(b) if b == "http" => MailBackend::Http,
            Some(b) if b == "log" => MailBackend::Log,
            Some(b) if b == "mock" => MailBackend::Mock,
            Some(other) => {
                return Err(Error::Config(format!(
                    "unknown BUDGETLY_MAIL_BACKEND: {}",
                    other
                )))
            }
            None if api_url.is_some() => MailBackend::Http,
            None => MailBackend::Log,
        };
        if backend == MailBackend::Http && api_url.is_none() {
            return Err(Error::Config(
                "BUDGETLY_MAIL_API_URL is required for the http mail backend".into(),
            ));
        }

        let timeout_secs = match get("BUDGETLY_MAIL_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|_| {
                Error::Config(format!("BUDGETLY_MAIL_TIMEOUT_SECS is not a number: {}", v))
            })?,
            None => DEFAULT_MAIL_TIMEOUT_SECS,
        };

        let mail = MailConfig {
            backend,
            api_url,
            api_key: get("BUDGETLY_MAIL_API_KEY"),
            from: get("BUDGETLY_MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            timeout_secs,
        };

        let ai_backend = get("AI_BACKEND")
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|| "openai_compatible".to_string());
        let ai = match (ai_backend.as_str(), get("OPENAI_COMPATIBLE_HOST")) {
            ("mock", host) => Some(AiConfig {
                backend: ai_backend.clone(),
                host: host.unwrap_or_else(|| "mock://localhost".to_string()),
                model: "mock".to_string(),
                api_key: None,
            }),
            (_, Some(host)) => Some(AiConfig {
                backend: ai_backend.clone(),
                host,
                model: get("OPENAI_COMPATIBLE_MODEL")
                    .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
                api_key: get("OPENAI_COMPATIBLE_API_KEY"),
            }),
            (_, None) => None,
        };

        Ok(Self {
            admin_emails,
            cron_secret: get("BUDGETLY_CRON_SECRET"),
            utc_offset,
            page_size,
            reminder_interval_hours,
            mail,
            ai,
        })
    }

    /// True iff `email` is on the admin allowlist (case-insensitive)
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        !email.is_empty() && self.admin_emails.iter().any(|a| *a == email)
    }

    /// Clamp a requested page size to the configured default and maximum
    pub fn page_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
            _ => self.page_size,
        }
    }
}

/// Parse a `±HH:MM` offset ("Z" and "UTC" are accepted for zero)
pub fn parse_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let invalid = || Error::Config(format!("invalid UTC offset (expected ±HH:MM): {}", value));

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn parse_interval_hours(value: &str) -> Result<Option<u64>> {
    let hours: u64 = value.parse().map_err(|_| {
        Error::Config(format!(
            "BUDGETLY_REMINDER_INTERVAL_HOURS is not a number: {}",
            value
        ))
    })?;

    if hours == 0 {
        warn!("BUDGETLY_REMINDER_INTERVAL_HOURS is 0, scheduled reminders disabled");
        return Ok(None);
    }
    if hours > MAX_REMINDER_INTERVAL_HOURS {
        return Err(Error::Config(format!(
            "BUDGETLY_REMINDER_INTERVAL_HOURS must be at most {}: {}",
            MAX_REMINDER_INTERVAL_HOURS, hours
        )));
    }
    Ok(Some(hours))
}

fn parse_email_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if !s.contains('@') {
                warn!(entry = s, "Ignoring admin entry without '@'");
                return None;
            }
            Some(s.to_lowercase())
        })
        .collect()
}

fn utc() -> FixedOffset {
    Utc.fix()
}
