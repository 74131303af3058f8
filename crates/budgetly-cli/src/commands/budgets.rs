//! Budget command implementations

use anyhow::Result;
use budgetly_core::models::{percentage, SortOrder};
use budgetly_core::Database;

use super::truncate;

pub fn cmd_budgets_list(db: &Database, owner: &str) -> Result<()> {
    let budgets = db.list_budgets_with_totals(owner, SortOrder::Asc)?;

    if budgets.is_empty() {
        println!("No budgets found for {}.", owner);
        println!("Create one from the dashboard: budgetly serve");
        return Ok(());
    }

    println!();
    println!("💰 Budgets for {}", owner);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4}  {:<24} {:>10} {:>10} {:>6} {:>5}",
        "ID", "Name", "Amount", "Spent", "Used", "Items"
    );

    for b in &budgets {
        let icon = b.budget.icon.as_deref().unwrap_or(" ");
        println!(
            "   {:>4}  {} {:<22} {:>10.2} {:>10.2} {:>5.0}% {:>5}",
            b.budget.id,
            icon,
            truncate(&b.budget.name, 22),
            b.budget.amount,
            b.total_spend,
            percentage(b.total_spend, b.budget.amount),
            b.total_items
        );
    }

    let total: f64 = budgets.iter().map(|b| b.budget.amount).sum();
    let spent: f64 = budgets.iter().map(|b| b.total_spend).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Total: ${:.2} budgeted, ${:.2} spent, ${:.2} remaining",
        total,
        spent,
        total - spent
    );
    println!();

    Ok(())
}
