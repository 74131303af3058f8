//! Transaction command implementations

use anyhow::Result;
use budgetly_core::Database;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, owner: &str, page: i64, limit: i64) -> Result<()> {
    let result = db.transaction_page(owner, page, limit)?;

    if result.total == 0 {
        println!("No transactions found for {}.", owner);
        return Ok(());
    }

    println!();
    println!(
        "📋 Transactions for {} (page {} of {}, {} total)",
        owner,
        result.page,
        result.total_pages.max(1),
        result.total
    );
    println!("   ─────────────────────────────────────────────────────────────────────");

    for tx in &result.transactions {
        let due = tx
            .next_due_date
            .map(|d| format!("next {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "   {:>5}  {}  {:<28} {:>10.2}  {:<14} {:<8} {}",
            tx.id,
            tx.created_at.format("%Y-%m-%d"),
            truncate(&tx.name, 28),
            tx.amount,
            truncate(tx.category.as_deref().unwrap_or("-"), 14),
            tx.recurring.as_str(),
            due
        );
    }

    if result.page < result.total_pages {
        println!();
        println!("   More: --page {}", result.page + 1);
    }

    Ok(())
}
