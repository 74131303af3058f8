//! AI advisor command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::warn;

use budgetly_core::ai::{fallback_tips, FALLBACK_INSIGHTS};
use budgetly_core::{AdvisorBackend, AdvisorClient, Database};

/// Print insights (or an answer to `question`) and quick tips for an owner
///
/// Falls back to canned advice when no advisor is configured or it fails.
pub async fn cmd_tips(
    db: &Database,
    advisor: Option<&AdvisorClient>,
    owner: &str,
    question: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let snapshot = db.financial_snapshot(owner, now)?;
    let summary = &snapshot.summary;

    println!();
    println!("📊 {}", owner);
    println!(
        "   Budgeted ${:.2}, spent ${:.2} ({:.1}%), remaining ${:.2}",
        summary.total_budget,
        summary.total_spent,
        summary.budget_utilization_percentage,
        summary.remaining_budget
    );
    println!();

    let Some(advisor) = advisor else {
        println!("   💡 Tip: Set OPENAI_COMPATIBLE_HOST for personalized advice");
        println!();
        print_advice(FALLBACK_INSIGHTS, &fallback_tips());
        return Ok(());
    };

    println!("   🤖 Asking {} ({})...", advisor.host(), advisor.model());
    println!();

    let insights = match advisor.financial_insights(&snapshot, question).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Advisor insights failed: {}", e);
            FALLBACK_INSIGHTS.to_string()
        }
    };

    let tips = match advisor.quick_tips(&snapshot).await {
        Ok(tips) if !tips.is_empty() => tips,
        Ok(_) => fallback_tips(),
        Err(e) => {
            warn!("Advisor tips failed: {}", e);
            fallback_tips()
        }
    };

    print_advice(&insights, &tips);
    Ok(())
}

fn print_advice(insights: &str, tips: &[String]) {
    for line in insights.lines() {
        println!("   {}", line);
    }
    println!();
    println!("   Quick tips:");
    for tip in tips {
        println!("   • {}", tip);
    }
    println!();
}
