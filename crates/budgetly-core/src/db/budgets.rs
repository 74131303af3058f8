//! Budget operations

use rusqlite::{params, OptionalExtension, Row};

use super::{datetime_column, require_owner, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetUpdate, BudgetWithTotals, NewBudget, SortOrder};

/// Budget columns plus aggregated totals, for `row_to_budget_with_totals`
const BUDGET_WITH_TOTALS_SELECT: &str = r#"
    SELECT b.id, b.name, b.amount, b.created_by, b.category, b.icon, b.created_at,
           COALESCE(SUM(t.amount), 0.0) AS total_spend,
           COUNT(t.id) AS total_items
    FROM budgets b
    LEFT JOIN transactions t ON t.budget_id = b.id
"#;

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        created_by: row.get(3)?,
        category: row.get(4)?,
        icon: row.get(5)?,
        created_at: datetime_column(row, 6)?,
    })
}

fn row_to_budget_with_totals(row: &Row<'_>) -> rusqlite::Result<BudgetWithTotals> {
    Ok(BudgetWithTotals {
        budget: row_to_budget(row)?,
        total_spend: row.get(7)?,
        total_items: row.get(8)?,
    })
}

fn validate_budget_fields(name: &str, amount: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidData("Budget name is required".into()));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidData(format!(
            "Budget amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

impl Database {
    /// Create a budget
    pub fn create_budget(&self, budget: &NewBudget) -> Result<Budget> {
        let owner = require_owner(&budget.created_by)?;
        validate_budget_fields(&budget.name, budget.amount)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (name, amount, created_by, category, icon) VALUES (?, ?, ?, ?, ?)",
            params![
                budget.name.trim(),
                budget.amount,
                owner,
                budget.category,
                budget.icon
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_budget(id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, name, amount, created_by, category, icon, created_at FROM budgets WHERE id = ?",
                params![id],
                row_to_budget,
            )
            .optional()?;

        Ok(budget)
    }

    /// List an owner's budgets with spending totals
    ///
    /// `SortOrder::Desc` (newest first) is what the dashboard shows;
    /// the budget list uses `SortOrder::Asc`.
    pub fn list_budgets_with_totals(
        &self,
        owner: &str,
        order: SortOrder,
    ) -> Result<Vec<BudgetWithTotals>> {
        let owner = require_owner(owner)?;
        let conn = self.conn()?;

        let sql = format!(
            "{} WHERE b.created_by = ? GROUP BY b.id ORDER BY b.id {}",
            BUDGET_WITH_TOTALS_SELECT,
            order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let budgets = stmt
            .query_map(params![owner], row_to_budget_with_totals)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Get a single budget with spending totals
    pub fn get_budget_with_totals(&self, id: i64) -> Result<BudgetWithTotals> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE b.id = ? GROUP BY b.id", BUDGET_WITH_TOTALS_SELECT);

        conn.query_row(&sql, params![id], row_to_budget_with_totals)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Update a budget's editable fields
    pub fn update_budget(&self, id: i64, update: &BudgetUpdate) -> Result<Budget> {
        validate_budget_fields(&update.name, update.amount)?;

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE budgets SET name = ?, amount = ?, icon = ? WHERE id = ?",
            params![update.name.trim(), update.amount, update.icon, id],
        )?;
        drop(conn);

        if changed == 0 {
            return Err(Error::NotFound(format!("budget {}", id)));
        }

        self.get_budget(id)?
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))
    }

    /// Delete a budget and, by cascade, its transactions
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;

        if changed == 0 {
            return Err(Error::NotFound(format!("budget {}", id)));
        }
        Ok(())
    }

    /// Count an owner's budgets
    pub fn count_budgets(&self, owner: &str) -> Result<i64> {
        let owner = require_owner(owner)?;
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM budgets WHERE created_by = ?",
            params![owner],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
