//! Reminder store backed by SQLite

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{datetime_column, format_datetime, opt_datetime_column, Database, ReminderStore};
use crate::error::{Error, Result};
use crate::models::{DueReminder, Recurrence};

impl ReminderStore for Database {
    fn reminder_candidates(&self, due_by: DateTime<Utc>) -> Result<Vec<DueReminder>> {
        let [daily, weekly, monthly, yearly] = Recurrence::ACTIVE;
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, b.created_by, t.name, t.amount, t.category, t.recurring,
                   b.name, t.next_due_date, t.last_reminder_sent
            FROM transactions t
            JOIN budgets b ON b.id = t.budget_id
            WHERE t.recurring IN (?, ?, ?, ?)
              AND t.next_due_date IS NOT NULL
              AND datetime(t.next_due_date) <= datetime(?)
            ORDER BY t.id ASC
            "#,
        )?;

        let candidates = stmt
            .query_map(
                params![daily, weekly, monthly, yearly, format_datetime(due_by)],
                |row| {
                    Ok(DueReminder {
                        transaction_id: row.get(0)?,
                        user_email: row.get(1)?,
                        transaction_name: row.get(2)?,
                        amount: row.get(3)?,
                        category: row.get(4)?,
                        recurring: row.get(5)?,
                        budget_name: row.get(6)?,
                        next_due_date: datetime_column(row, 7)?,
                        last_reminder_sent: opt_datetime_column(row, 8)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(candidates)
    }

    fn mark_reminder_sent(&self, transaction_id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions SET last_reminder_sent = ? WHERE id = ?",
            params![format_datetime(at), transaction_id],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", transaction_id)));
        }
        Ok(())
    }
}
