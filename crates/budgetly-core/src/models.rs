//! Domain models for Budgetly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A named spending-limit bucket owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub name: String,
    /// Target amount (never negative)
    pub amount: f64,
    /// Owner email
    pub created_by: String,
    pub category: Option<String>,
    /// Emoji or icon glyph shown next to the budget
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub name: String,
    pub amount: f64,
    pub created_by: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Editable budget fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUpdate {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A budget with the totals of its linked transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetWithTotals {
    #[serde(flatten)]
    pub budget: Budget,
    pub total_spend: f64,
    pub total_items: i64,
}

/// Recurrence period of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// The periods that participate in reminder logic
    pub const ACTIVE: [Recurrence; 4] = [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::str::FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::InvalidPeriod(other.to_string())),
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single expense entry linked to one budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub budget_id: i64,
    pub category: Option<String>,
    pub recurring: Recurrence,
    /// Only meaningful when `recurring` is not `none`
    pub next_due_date: Option<DateTime<Utc>>,
    pub last_reminder_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for logging a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub amount: f64,
    pub budget_id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub recurring: Recurrence,
}

/// One page of an owner's transactions, newest first
#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Count across all pages
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl TransactionPage {
    pub fn page_count(total: i64, limit: i64) -> i64 {
        if limit <= 0 {
            return 0;
        }
        (total + limit - 1) / limit
    }
}

/// Spending summed per category across an owner's transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    /// "Uncategorized" when the transactions carry no category
    pub category: String,
    pub total_amount: f64,
    pub transaction_count: i64,
}

/// Label used for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Ordering for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A recurring transaction whose reminder is due, with everything
/// needed to send the email without a further lookup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DueReminder {
    pub transaction_id: i64,
    pub user_email: String,
    pub transaction_name: String,
    pub amount: f64,
    pub category: Option<String>,
    pub recurring: Recurrence,
    pub budget_name: String,
    pub next_due_date: DateTime<Utc>,
    pub last_reminder_sent: Option<DateTime<Utc>>,
}

impl DueReminder {
    pub fn content(&self) -> ReminderContent {
        ReminderContent {
            name: self.transaction_name.clone(),
            amount: self.amount,
            category: self.category.clone(),
            recurring: self.recurring,
            budget_name: Some(self.budget_name.clone()),
        }
    }
}

/// Display data for a reminder email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderContent {
    pub name: String,
    pub amount: f64,
    pub category: Option<String>,
    pub recurring: Recurrence,
    pub budget_name: Option<String>,
}

impl ReminderContent {
    /// Placeholder content used by the "sample reminder" test email
    pub fn sample() -> Self {
        Self {
            name: "Sample Recurring Transaction".to_string(),
            amount: 1000.0,
            category: Some("Test Category".to_string()),
            recurring: Recurrence::Monthly,
            budget_name: None,
        }
    }
}

/// Outcome of one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderOutcome {
    Sent,
    Failed,
}

/// Result of one reminder dispatch attempt (not persisted)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderEvent {
    pub transaction_id: i64,
    pub user_email: String,
    pub status: ReminderOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReminderEvent {
    pub fn sent(transaction_id: i64, user_email: &str, message_id: String) -> Self {
        Self {
            transaction_id,
            user_email: user_email.to_string(),
            status: ReminderOutcome::Sent,
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failed(transaction_id: i64, user_email: &str, error: String) -> Self {
        Self {
            transaction_id,
            user_email: user_email.to_string(),
            status: ReminderOutcome::Failed,
            message_id: None,
            error: Some(error),
        }
    }
}

/// Everything a dispatch run attempted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub processed_count: usize,
    pub total_due: usize,
    pub results: Vec<ReminderEvent>,
}

impl DispatchSummary {
    pub fn sent_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ReminderOutcome::Sent)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.processed_count - self.sent_count()
    }
}

/// Headline numbers for an owner's finances
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining_budget: f64,
    pub total_transactions: i64,
    pub average_transaction_amount: f64,
    pub budget_utilization_percentage: f64,
}

/// How much of one budget has been used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUtilization {
    pub name: String,
    pub amount: f64,
    pub total_spend: f64,
    pub category: Option<String>,
    pub utilization_percentage: f64,
}

/// Spending total for one calendar month ("YYYY-MM")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySpending {
    pub month: String,
    pub total_amount: f64,
}

/// Input for the AI advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub summary: FinancialSummary,
    pub budgets: Vec<BudgetUtilization>,
    pub recent_transactions: Vec<Transaction>,
    pub category_spending: Vec<CategoryTotal>,
    pub monthly_spending: Vec<MonthlySpending>,
}

impl FinancialSnapshot {
    /// True when the owner has not created anything yet
    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty() && self.recent_transactions.is_empty()
    }
}

/// Database-wide counts for status output
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DatabaseStats {
    pub owners: i64,
    pub budgets: i64,
    pub transactions: i64,
    pub recurring_transactions: i64,
}

/// Percentage of `part` in `whole`, 0 when `whole` is not positive
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_round_trips_through_str() {
        for r in [
            Recurrence::None,
            Recurrence::Daily,
            Recurrence::Weekly,
            Recurrence::Monthly,
            Recurrence::Yearly,
        ] {
            assert_eq!(r.as_str().parse::<Recurrence>().unwrap(), r);
        }
    }

    #[test]
    fn test_recurrence_rejects_unknown_values() {
        let err = "fortnightly".parse::<Recurrence>().unwrap_err();
        assert!(matches!(err, Error::InvalidPeriod(ref p) if p == "fortnightly"));
        // Values are case-sensitive
        assert!("Monthly".parse::<Recurrence>().is_err());
    }

    #[test]
    fn test_recurrence_serde_lowercase() {
        let json = serde_json::to_string(&Recurrence::Weekly).unwrap();
        assert_eq!(json, "\"weekly\"");
        let parsed: Recurrence = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(parsed, Recurrence::Yearly);
        assert!(serde_json::from_str::<Recurrence>("\"hourly\"").is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(TransactionPage::page_count(0, 10), 0);
        assert_eq!(TransactionPage::page_count(10, 10), 1);
        assert_eq!(TransactionPage::page_count(11, 10), 2);
        assert_eq!(TransactionPage::page_count(5, 0), 0);
    }

    #[test]
    fn test_dispatch_summary_serializes_camel_case() {
        let summary = DispatchSummary {
            processed_count: 2,
            total_due: 2,
            results: vec![
                ReminderEvent::sent(1, "a@example.com", "msg-1".into()),
                ReminderEvent::failed(2, "b@example.com", "smtp down".into()),
            ],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processedCount"], 2);
        assert_eq!(json["totalDue"], 2);
        assert_eq!(json["results"][0]["status"], "sent");
        assert_eq!(json["results"][0]["messageId"], "msg-1");
        assert!(json["results"][0].get("error").is_none());
        assert_eq!(json["results"][1]["status"], "failed");
        assert_eq!(json["results"][1]["error"], "smtp down");
        assert_eq!(summary.sent_count(), 1);
        assert_eq!(summary.failed_count(), 1);
    }

    #[test]
    fn test_percentage_handles_zero_whole() {
        assert_eq!(percentage(50.0, 0.0), 0.0);
        assert!((percentage(25.0, 200.0) - 12.5).abs() < f64::EPSILON);
    }
}
