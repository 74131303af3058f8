//! Transaction operations

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{datetime_column, format_datetime, opt_datetime_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};
use crate::recurrence::next_due_date;

/// Column list matching `row_to_transaction` (table alias `t`)
pub(crate) const TRANSACTION_COLUMNS: &str = "t.id, t.name, t.amount, t.budget_id, t.category, \
     t.recurring, t.next_due_date, t.last_reminder_sent, t.created_at";

pub(crate) fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        budget_id: row.get(3)?,
        category: row.get(4)?,
        recurring: row.get(5)?,
        next_due_date: opt_datetime_column(row, 6)?,
        last_reminder_sent: opt_datetime_column(row, 7)?,
        created_at: datetime_column(row, 8)?,
    })
}

impl Database {
    /// Log a transaction against an existing budget
    ///
    /// Recurring transactions get their first due date one period after
    /// `now`, computed on the calendar of `now`'s zone.
    pub fn create_transaction<Tz: TimeZone>(
        &self,
        tx: &NewTransaction,
        now: DateTime<Tz>,
    ) -> Result<Transaction> {
        if tx.name.trim().is_empty() {
            return Err(Error::InvalidData("Transaction name is required".into()));
        }
        if !tx.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be a number, got {}",
                tx.amount
            )));
        }
        if self.get_budget(tx.budget_id)?.is_none() {
            return Err(Error::NotFound(format!("budget {}", tx.budget_id)));
        }

        let created_at = now.with_timezone(&Utc);
        let next_due = if tx.recurring.is_recurring() {
            Some(next_due_date(now, tx.recurring)?.with_timezone(&Utc))
        } else {
            None
        };
        let category = tx
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (name, amount, budget_id, category, recurring, next_due_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.name.trim(),
                tx.amount,
                tx.budget_id,
                category,
                tx.recurring,
                next_due.map(format_datetime),
                format_datetime(created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.id = ?",
            TRANSACTION_COLUMNS
        );
        let tx = conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?;

        Ok(tx)
    }

    /// Owner email of the budget a transaction belongs to
    pub fn transaction_owner(&self, id: i64) -> Result<Option<String>> {
        let conn = self.conn()?;
        let owner = conn
            .query_row(
                r#"
                SELECT b.created_by FROM transactions t
                JOIN budgets b ON b.id = t.budget_id
                WHERE t.id = ?
                "#,
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(owner)
    }

    /// List a budget's transactions in insertion order
    pub fn list_budget_transactions(&self, budget_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.budget_id = ? ORDER BY t.id ASC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![budget_id], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;

        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        Ok(())
    }
}
