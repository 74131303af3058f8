//! Budgetly Core Library
//!
//! Shared functionality for the Budgetly personal finance dashboard:
//! - Database access and migrations (budgets, transactions, audit log)
//! - Recurrence arithmetic and the due-today predicate
//! - Recurring-transaction reminder scan and dispatch
//! - Pluggable email senders (HTTP mail relay, log, mock)
//! - Pluggable AI advisor backends for financial tips
//! - Explicit application configuration

pub mod ai;
pub mod clock;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod identity;
pub mod models;
pub mod recurrence;
pub mod reminders;

/// Test utilities including mock chat-completion and mail relay servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AdvisorBackend, AdvisorClient, MockBackend, OpenAICompatibleBackend};
pub use clock::{is_today, is_today_at, Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use db::{AuditEntry, Database, ReminderStore};
pub use email::{EmailSender, LogMailer, Mailer, MockMailer};
pub use error::{Error, Result};
pub use identity::Identity;
pub use recurrence::{next_due_date, next_due_day};
pub use reminders::{find_due_reminders, ReminderDispatcher};
