//! Read-only aggregation queries

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rusqlite::params;

use super::transactions::{row_to_transaction, TRANSACTION_COLUMNS};
use super::{format_datetime, require_owner, Database};
use crate::config::MAX_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::models::{
    percentage, BudgetUtilization, CategoryTotal, DatabaseStats, FinancialSnapshot,
    FinancialSummary, MonthlySpending, SortOrder, TransactionPage, UNCATEGORIZED,
};

/// Transactions included in an advisor snapshot
const SNAPSHOT_RECENT_TRANSACTIONS: i64 = 10;

/// Calendar months of history in an advisor snapshot (including the current one)
const SNAPSHOT_MONTHS: u32 = 6;

impl Database {
    /// One page of an owner's transactions, newest first
    ///
    /// `page` is 1-based; values below 1 are clamped, pages whose offset
    /// cannot be represented are rejected.
    pub fn transaction_page(&self, owner: &str, page: i64, limit: i64) -> Result<TransactionPage> {
        let owner = require_owner(owner)?;
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| Error::InvalidData(format!("Page {} is out of range", page)))?;

        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM transactions t
            JOIN budgets b ON b.id = t.budget_id
            WHERE b.created_by = ?
            "#,
            params![owner],
            |row| row.get(0),
        )?;

        let sql = format!(
            r#"
            SELECT {} FROM transactions t
            JOIN budgets b ON b.id = t.budget_id
            WHERE b.created_by = ?
            ORDER BY t.id DESC
            LIMIT ? OFFSET ?
            "#,
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![owner, limit, offset], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            transactions,
            total,
            page,
            limit,
            total_pages: TransactionPage::page_count(total, limit),
        })
    }

    /// Spending per category across an owner's transactions, largest first
    pub fn category_totals(&self, owner: &str) -> Result<Vec<CategoryTotal>> {
        let owner = require_owner(owner)?;
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(NULLIF(TRIM(t.category), ''), ?) AS label,
                   SUM(t.amount) AS total_amount,
                   COUNT(*) AS transaction_count
            FROM transactions t
            JOIN budgets b ON b.id = t.budget_id
            WHERE b.created_by = ?
            GROUP BY label
            ORDER BY total_amount DESC, label ASC
            "#,
        )?;

        let totals = stmt
            .query_map(params![UNCATEGORIZED, owner], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total_amount: row.get(1)?,
                    transaction_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Monthly spending totals for months starting at or after `since`
    fn monthly_spending(&self, owner: &str, since: DateTime<Utc>) -> Result<Vec<MonthlySpending>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT strftime('%Y-%m', t.created_at) AS month, SUM(t.amount)
            FROM transactions t
            JOIN budgets b ON b.id = t.budget_id
            WHERE b.created_by = ? AND t.created_at >= ?
            GROUP BY month
            ORDER BY month ASC
            "#,
        )?;

        let months = stmt
            .query_map(params![owner, format_datetime(since)], |row| {
                Ok(MonthlySpending {
                    month: row.get(0)?,
                    total_amount: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(months)
    }

    /// Everything the AI advisor needs to know about an owner's finances
    pub fn financial_snapshot(&self, owner: &str, now: DateTime<Utc>) -> Result<FinancialSnapshot> {
        let owner = require_owner(owner)?;

        let budgets = self.list_budgets_with_totals(owner, SortOrder::Desc)?;
        let recent = self.transaction_page(owner, 1, SNAPSHOT_RECENT_TRANSACTIONS)?;
        let category_spending = self.category_totals(owner)?;
        let monthly_spending = self.monthly_spending(owner, history_start(now))?;

        let total_budget: f64 = budgets.iter().map(|b| b.budget.amount).sum();
        let total_spent: f64 = budgets.iter().map(|b| b.total_spend).sum();
        let total_transactions: i64 = budgets.iter().map(|b| b.total_items).sum();

        let summary = FinancialSummary {
            total_budget,
            total_spent,
            remaining_budget: total_budget - total_spent,
            total_transactions,
            average_transaction_amount: if total_transactions > 0 {
                total_spent / total_transactions as f64
            } else {
                0.0
            },
            budget_utilization_percentage: percentage(total_spent, total_budget),
        };

        let budgets = budgets
            .into_iter()
            .map(|b| BudgetUtilization {
                utilization_percentage: percentage(b.total_spend, b.budget.amount),
                name: b.budget.name,
                amount: b.budget.amount,
                total_spend: b.total_spend,
                category: b.budget.category,
            })
            .collect();

        Ok(FinancialSnapshot {
            summary,
            budgets,
            recent_transactions: recent.transactions,
            category_spending,
            monthly_spending,
        })
    }

    /// Counts across all owners
    pub fn stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT created_by) FROM budgets),
                (SELECT COUNT(*) FROM budgets),
                (SELECT COUNT(*) FROM transactions),
                (SELECT COUNT(*) FROM transactions WHERE recurring != 'none')
            "#,
            [],
            |row| {
                Ok(DatabaseStats {
                    owners: row.get(0)?,
                    budgets: row.get(1)?,
                    transactions: row.get(2)?,
                    recurring_transactions: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

/// First instant of the month `SNAPSHOT_MONTHS - 1` months before `now`
fn history_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first_of_month = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or(NaiveDate::MIN);
    first_of_month
        .checked_sub_months(Months::new(SNAPSHOT_MONTHS - 1))
        .unwrap_or(first_of_month)
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}
