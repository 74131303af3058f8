//! Prompt construction for the financial advisor

use std::fmt::Write;

use crate::models::FinancialSnapshot;

/// System prompt shared by every advisor request
pub const SYSTEM_PROMPT: &str = "You are a helpful financial advisor for a personal budgeting app. \
Give practical, specific advice based on the user's actual budgets and spending. \
Be encouraging, keep answers concise, and never recommend specific investment products.";

/// Render the snapshot as plain text for the model
pub fn describe_snapshot(snapshot: &FinancialSnapshot) -> String {
    if snapshot.is_empty() {
        return "The user is new and has not created any budgets or transactions yet.\n"
            .to_string();
    }

    let s = &snapshot.summary;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "- Total budget: ${:.2}", s.total_budget);
    let _ = writeln!(out, "- Total spent: ${:.2}", s.total_spent);
    let _ = writeln!(out, "- Remaining: ${:.2}", s.remaining_budget);
    let _ = writeln!(
        out,
        "- Budget utilization: {:.1}%",
        s.budget_utilization_percentage
    );
    let _ = writeln!(
        out,
        "- Transactions: {} (average ${:.2})",
        s.total_transactions, s.average_transaction_amount
    );

    if !snapshot.budgets.is_empty() {
        let _ = writeln!(out, "\nBudgets:");
        for b in &snapshot.budgets {
            let _ = writeln!(
                out,
                "- {}: ${:.2} of ${:.2} used ({:.1}%)",
                b.name, b.total_spend, b.amount, b.utilization_percentage
            );
        }
    }

    if !snapshot.category_spending.is_empty() {
        let _ = writeln!(out, "\nSpending by category:");
        for c in &snapshot.category_spending {
            let _ = writeln!(
                out,
                "- {}: ${:.2} across {} transactions",
                c.category, c.total_amount, c.transaction_count
            );
        }
    }

    if !snapshot.monthly_spending.is_empty() {
        let _ = writeln!(out, "\nMonthly spending:");
        for m in &snapshot.monthly_spending {
            let _ = writeln!(out, "- {}: ${:.2}", m.month, m.total_amount);
        }
    }

    if !snapshot.recent_transactions.is_empty() {
        let _ = writeln!(out, "\nRecent transactions:");
        for t in &snapshot.recent_transactions {
            let _ = writeln!(
                out,
                "- {} ${:.2} ({}, {})",
                t.name,
                t.amount,
                t.category.as_deref().unwrap_or("uncategorized"),
                t.recurring
            );
        }
    }

    out
}

/// User prompt for the insights request
pub fn insights_prompt(snapshot: &FinancialSnapshot, question: Option<&str>) -> String {
    let data = describe_snapshot(snapshot);
    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(question) => format!(
            "Here is my financial data:\n\n{}\nMy question: {}",
            data, question
        ),
        None => format!(
            "Here is my financial data:\n\n{}\nAnalyze my finances and give me personalized insights and recommendations.",
            data
        ),
    }
}

/// User prompt for the quick tips request
pub fn tips_prompt(snapshot: &FinancialSnapshot) -> String {
    format!(
        "Here is my financial data:\n\n{}\nGive me 3 to 5 short, actionable money tips. \
         Reply with one tip per line, each starting with \"• \", and nothing else.",
        describe_snapshot(snapshot)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetUtilization, FinancialSummary};

    #[test]
    fn test_empty_snapshot_mentions_new_user() {
        let prompt = insights_prompt(&FinancialSnapshot::default(), None);
        assert!(prompt.contains("new"));
        assert!(prompt.contains("personalized insights"));
    }

    #[test]
    fn test_question_is_embedded() {
        let snapshot = FinancialSnapshot {
            summary: FinancialSummary {
                total_budget: 1000.0,
                total_spent: 450.0,
                remaining_budget: 550.0,
                total_transactions: 1,
                average_transaction_amount: 450.0,
                budget_utilization_percentage: 45.0,
            },
            budgets: vec![BudgetUtilization {
                name: "Food".to_string(),
                amount: 500.0,
                total_spend: 450.0,
                category: None,
                utilization_percentage: 90.0,
            }],
            ..FinancialSnapshot::default()
        };

        let prompt = insights_prompt(&snapshot, Some("  Can I afford a vacation? "));
        assert!(prompt.contains("My question: Can I afford a vacation?"));
        assert!(prompt.contains("- Food: $450.00 of $500.00 used (90.0%)"));
        assert!(prompt.contains("Budget utilization: 45.0%"));

        // Blank questions fall back to the general analysis prompt
        assert!(insights_prompt(&snapshot, Some(" ")).contains("Analyze my finances"));
    }
}
