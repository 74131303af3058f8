//! Integration tests for budgetly-core
//!
//! These tests exercise the full budget → transaction → reminder workflow.

use budgetly_core::{
    ai::{fallback_tips, AdvisorBackend, AdvisorClient},
    clock::{Clock, FixedClock},
    config::AppConfig,
    db::Database,
    email::MockMailer,
    find_due_reminders,
    models::{NewBudget, NewTransaction, Recurrence, ReminderOutcome, SortOrder},
    ReminderDispatcher,
};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn budget(db: &Database, name: &str, amount: f64, owner: &str) -> i64 {
    db.create_budget(&NewBudget {
        name: name.to_string(),
        amount,
        created_by: owner.to_string(),
        category: None,
        icon: None,
    })
    .expect("Failed to create budget")
    .id
}

fn transaction(
    db: &Database,
    budget_id: i64,
    name: &str,
    amount: f64,
    category: &str,
    recurring: Recurrence,
    now: DateTime<Utc>,
) -> i64 {
    db.create_transaction(
        &NewTransaction {
            name: name.to_string(),
            amount,
            budget_id,
            category: Some(category.to_string()),
            recurring,
        },
        now,
    )
    .expect("Failed to create transaction")
    .id
}

// =============================================================================
// Dashboard Workflow
// =============================================================================

#[test]
fn test_dashboard_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let now = at(2024, 3, 10, 12);

    let food = budget(&db, "Food", 500.0, ALICE);
    let home = budget(&db, "Home", 1500.0, ALICE);
    let other = budget(&db, "Other", 100.0, BOB);

    transaction(&db, food, "Groceries", 120.0, "Food", Recurrence::None, now);
    transaction(&db, food, "Takeout", 30.0, "Dining", Recurrence::None, now);
    transaction(&db, home, "Rent", 1200.0, "Housing", Recurrence::Monthly, now);
    transaction(&db, other, "Coffee", 4.5, "Dining", Recurrence::None, now);

    // Newest budget first on the dashboard
    let budgets = db.list_budgets_with_totals(ALICE, SortOrder::Desc).unwrap();
    assert_eq!(budgets.len(), 2);
    assert_eq!(budgets[0].budget.name, "Home");
    assert_eq!(budgets[0].total_spend, 1200.0);
    assert_eq!(budgets[1].total_spend, 150.0);
    assert_eq!(budgets[1].total_items, 2);

    // Bob's spending never leaks into Alice's aggregates
    let categories = db.category_totals(ALICE).unwrap();
    let labels: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(labels, vec!["Housing", "Food", "Dining"]);
    assert_eq!(categories[2].total_amount, 30.0);

    let page = db.transaction_page(ALICE, 1, 2).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.transactions[0].name, "Rent");

    let snapshot = db.financial_snapshot(ALICE, now).unwrap();
    assert_eq!(snapshot.summary.total_budget, 2000.0);
    assert_eq!(snapshot.summary.total_spent, 1350.0);
    assert_eq!(snapshot.summary.remaining_budget, 650.0);
    assert!((snapshot.summary.budget_utilization_percentage - 67.5).abs() < 1e-9);
    assert_eq!(snapshot.summary.total_transactions, 3);

    // Deleting a budget removes its transactions
    db.delete_budget(home).unwrap();
    assert_eq!(db.transaction_page(ALICE, 1, 10).unwrap().total, 2);
}

// =============================================================================
// Reminder Workflow
// =============================================================================

#[tokio::test]
async fn test_reminder_workflow_over_a_month() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let tz = FixedOffset::east_opt(0).unwrap();
    let clock = FixedClock::new(at(2023, 12, 15, 9));

    let home = budget(&db, "Home", 1500.0, ALICE);
    let rent = transaction(&db, home, "Rent", 1200.0, "Housing", Recurrence::Monthly, clock.now());
    transaction(&db, home, "Lamp", 40.0, "Home", Recurrence::None, clock.now());

    let stored = db.get_transaction(rent).unwrap().unwrap();
    assert_eq!(stored.next_due_date, Some(at(2024, 1, 15, 9)));

    let mailer = MockMailer::new();
    let dispatcher = ReminderDispatcher::new(&db, &mailer, tz);

    // Nothing is due a week before
    clock.set(at(2024, 1, 8, 10));
    assert!(find_due_reminders(&db, clock.now(), &tz).unwrap().is_empty());

    // On the due date the reminder goes out once
    clock.set(at(2024, 1, 15, 10));
    let summary = dispatcher.dispatch(clock.now()).await.unwrap();
    assert_eq!(summary.total_due, 1);
    assert_eq!(summary.results[0].status, ReminderOutcome::Sent);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.to, ALICE);
    assert!(sent[0].message.subject.contains("Rent"));
    assert_eq!(sent[0].due, NaiveDate::from_ymd_opt(2024, 1, 15));

    clock.advance(Duration::hours(6));
    let again = dispatcher.dispatch(clock.now()).await.unwrap();
    assert_eq!(again.total_due, 0);

    let stored = db.get_transaction(rent).unwrap().unwrap();
    assert_eq!(stored.last_reminder_sent, Some(at(2024, 1, 15, 10)));
}

#[tokio::test]
async fn test_failed_reminder_is_retried_next_run() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let tz = FixedOffset::east_opt(0).unwrap();

    let home = budget(&db, "Home", 1500.0, ALICE);
    let gym = budget(&db, "Gym", 80.0, BOB);
    transaction(&db, gym, "Membership", 45.0, "Health", Recurrence::Weekly, at(2024, 1, 8, 7));
    transaction(&db, home, "Internet", 60.0, "Utilities", Recurrence::Weekly, at(2024, 1, 8, 7));

    let mailer = MockMailer::new();
    mailer.fail_for(BOB);
    let dispatcher = ReminderDispatcher::new(&db, &mailer, tz);

    let first = dispatcher.dispatch(at(2024, 1, 15, 8)).await.unwrap();
    assert_eq!(first.processed_count, 2);
    assert_eq!(first.sent_count(), 1);
    assert_eq!(first.failed_count(), 1);

    // Bob's reminder was never recorded, so the next run picks it up
    let second = dispatcher.dispatch(at(2024, 1, 15, 9)).await.unwrap();
    assert_eq!(second.total_due, 1);
    assert_eq!(second.results[0].user_email, BOB);
}

// =============================================================================
// Advisor
// =============================================================================

#[tokio::test]
async fn test_mock_advisor_from_config() {
    let config = AppConfig::from_lookup(|key| match key {
        "AI_BACKEND" => Some("mock".to_string()),
        _ => None,
    })
    .unwrap();

    let advisor = AdvisorClient::from_config(&config).expect("advisor configured");
    assert!(advisor.health_check().await);

    let db = Database::in_memory().unwrap();
    let food = budget(&db, "Food", 400.0, ALICE);
    transaction(&db, food, "Groceries", 100.0, "Food", Recurrence::None, at(2024, 3, 1, 9));

    let snapshot = db.financial_snapshot(ALICE, at(2024, 3, 10, 9)).unwrap();
    let insights = advisor.financial_insights(&snapshot, None).await.unwrap();
    assert!(insights.contains("25.0%"));

    let tips = advisor.quick_tips(&snapshot).await.unwrap();
    assert!(!tips.is_empty());
    assert!(tips.len() <= 5);
    assert_ne!(tips, fallback_tips());
}
