//! CLI command tests

use budgetly_core::models::{NewBudget, NewTransaction, Recurrence};
use budgetly_core::{AdvisorClient, AppConfig, Database, MockBackend, MockMailer};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const OWNER: &str = "alice@example.com";

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Database with one budget and a monthly rent transaction created on 2023-12-15
fn setup_test_db() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    let budget = db
        .create_budget(&NewBudget {
            name: "Home".to_string(),
            amount: 1500.0,
            created_by: OWNER.to_string(),
            category: None,
            icon: Some("🏠".to_string()),
        })
        .unwrap();
    let rent = db
        .create_transaction(
            &NewTransaction {
                name: "Rent".to_string(),
                amount: 1200.0,
                budget_id: budget.id,
                category: Some("Housing".to_string()),
                recurring: Recurrence::Monthly,
            },
            at(2023, 12, 15, 9),
        )
        .unwrap();
    (db, rent.id)
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budgetly.db");

    commands::cmd_init(&path).unwrap();
    assert!(path.exists());

    // Re-running against an existing database is fine
    commands::cmd_init(&path).unwrap();
    let db = commands::open_db(&path).unwrap();
    assert_eq!(db.stats().unwrap().budgets, 0);
}

#[test]
fn test_cmd_status() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("budgetly.db");
    let config = AppConfig::default();

    // Missing database is reported, not an error
    commands::cmd_status(&path, &config, at(2024, 1, 15, 10)).unwrap();

    commands::cmd_init(&path).unwrap();
    commands::cmd_status(&path, &config, at(2024, 1, 15, 10)).unwrap();
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long transaction name", 10), "a long ...");
    // Multi-byte characters are never split
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}

// ========== Listing Command Tests ==========

#[test]
fn test_cmd_budgets_list() {
    let (db, _) = setup_test_db();
    commands::cmd_budgets_list(&db, OWNER).unwrap();
    commands::cmd_budgets_list(&db, "nobody@example.com").unwrap();
}

#[test]
fn test_cmd_budgets_list_requires_owner() {
    let (db, _) = setup_test_db();
    assert!(commands::cmd_budgets_list(&db, " ").is_err());
}

#[test]
fn test_cmd_transactions_list() {
    let (db, _) = setup_test_db();
    commands::cmd_transactions_list(&db, OWNER, 1, 10).unwrap();
    // Out-of-range pages are clamped by the store
    commands::cmd_transactions_list(&db, OWNER, 0, 500).unwrap();
    commands::cmd_transactions_list(&db, "nobody@example.com", 1, 10).unwrap();
}

// ========== Reminder Command Tests ==========

#[test]
fn test_cmd_reminders_due_sends_nothing() {
    let (db, rent) = setup_test_db();
    commands::cmd_reminders_due(&db, &AppConfig::default(), at(2024, 1, 15, 10)).unwrap();

    let tx = db.get_transaction(rent).unwrap().unwrap();
    assert!(tx.last_reminder_sent.is_none());
}

#[tokio::test]
async fn test_cmd_reminders_run() {
    let (db, rent) = setup_test_db();
    let mailer = MockMailer::new();
    let config = AppConfig::default();

    commands::cmd_reminders_run(&db, &mailer, &config, at(2024, 1, 15, 10), false)
        .await
        .unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.to, OWNER);
    assert_eq!(sent[0].due, NaiveDate::from_ymd_opt(2024, 1, 15));

    let tx = db.get_transaction(rent).unwrap().unwrap();
    assert_eq!(tx.last_reminder_sent, Some(at(2024, 1, 15, 10)));

    let audit = db.list_audit_log(1).unwrap();
    assert_eq!(audit[0].user_email, "cli");
    assert_eq!(audit[0].details.as_deref(), Some("sent=1, failed=0, due=1"));

    // Same day again: nothing left to send
    commands::cmd_reminders_run(&db, &mailer, &config, at(2024, 1, 15, 18), true)
        .await
        .unwrap();
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_cmd_reminders_run_uses_configured_zone() {
    let (db, _) = setup_test_db();
    let mailer = MockMailer::new();
    let now = at(2024, 1, 14, 12);

    // Still the 14th in UTC, rent is due on the 15th
    commands::cmd_reminders_run(&db, &mailer, &AppConfig::default(), now, false)
        .await
        .unwrap();
    assert!(mailer.sent().is_empty());

    // Already the 15th at UTC+12
    let config = AppConfig {
        utc_offset: FixedOffset::east_opt(12 * 3600).unwrap(),
        ..AppConfig::default()
    };
    commands::cmd_reminders_run(&db, &mailer, &config, now, false)
        .await
        .unwrap();
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(mailer.sent()[0].due, NaiveDate::from_ymd_opt(2024, 1, 15));
}

#[tokio::test]
async fn test_cmd_reminders_run_reports_failures() {
    let (db, rent) = setup_test_db();
    let mailer = MockMailer::new();
    mailer.fail_for(OWNER);

    commands::cmd_reminders_run(&db, &mailer, &AppConfig::default(), at(2024, 1, 15, 10), false)
        .await
        .unwrap();

    let tx = db.get_transaction(rent).unwrap().unwrap();
    assert!(tx.last_reminder_sent.is_none());
}

#[tokio::test]
async fn test_cmd_reminders_test() {
    let mailer = MockMailer::new();
    let config = AppConfig::default();
    let now = at(2024, 1, 15, 10);

    commands::cmd_reminders_test(&mailer, &config, "qa@example.com", "test", now)
        .await
        .unwrap();
    commands::cmd_reminders_test(&mailer, &config, "qa@example.com", "reminder", now)
        .await
        .unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].due.is_none());
    assert_eq!(sent[1].due, NaiveDate::from_ymd_opt(2024, 1, 15));

    let err = commands::cmd_reminders_test(&mailer, &config, "qa@example.com", "digest", now)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown email type"));

    assert!(commands::cmd_reminders_test(&mailer, &config, "  ", "test", now)
        .await
        .is_err());

    mailer.fail_for("down@example.com");
    let err = commands::cmd_reminders_test(&mailer, &config, "down@example.com", "test", now)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to send test email"));
}

// ========== Advisor Command Tests ==========

#[tokio::test]
async fn test_cmd_tips() {
    let (db, _) = setup_test_db();
    let now = at(2024, 1, 20, 10);

    let advisor = AdvisorClient::mock();
    commands::cmd_tips(&db, Some(&advisor), OWNER, None, now)
        .await
        .unwrap();
    commands::cmd_tips(&db, Some(&advisor), OWNER, Some("Can I save more?"), now)
        .await
        .unwrap();

    // Failing and missing advisors fall back to canned advice
    let failing = AdvisorClient::Mock(MockBackend::failing());
    commands::cmd_tips(&db, Some(&failing), OWNER, None, now)
        .await
        .unwrap();
    commands::cmd_tips(&db, None, OWNER, None, now).await.unwrap();
}
