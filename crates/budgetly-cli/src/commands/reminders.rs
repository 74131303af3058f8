//! Reminder command implementations (due, run, test)

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use budgetly_core::clock::local_date;
use budgetly_core::models::{ReminderContent, ReminderOutcome};
use budgetly_core::{find_due_reminders, AppConfig, Database, EmailSender, ReminderDispatcher};

use super::truncate;

/// Preview the reminders a dispatch at `now` would send
pub fn cmd_reminders_due(db: &Database, config: &AppConfig, now: DateTime<Utc>) -> Result<()> {
    let due = find_due_reminders(db, now, &config.utc_offset)?;

    if due.is_empty() {
        println!("✅ No reminders due today.");
        return Ok(());
    }

    println!();
    println!("🔔 {} reminder(s) due", due.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for r in &due {
        println!(
            "   {:>5}  {:<24} {:>10.2}  {:<8} due {}  → {}",
            r.transaction_id,
            truncate(&r.transaction_name, 24),
            r.amount,
            r.recurring.as_str(),
            local_date(r.next_due_date, &config.utc_offset),
            r.user_email
        );
    }
    println!();

    Ok(())
}

/// Send every due reminder through `mailer`
pub async fn cmd_reminders_run(
    db: &Database,
    mailer: &dyn EmailSender,
    config: &AppConfig,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dispatcher = ReminderDispatcher::new(db, mailer, config.utc_offset);
    let summary = dispatcher
        .dispatch(now)
        .await
        .context("Reminder dispatch failed")?;

    db.log_audit(
        "cli",
        "dispatch",
        Some("reminder"),
        None,
        Some(&format!(
            "sent={}, failed={}, due={}",
            summary.sent_count(),
            summary.failed_count(),
            summary.total_due
        )),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("📨 Sending reminders via {}...", mailer.name());
    for event in &summary.results {
        match event.status {
            ReminderOutcome::Sent => println!(
                "   ✅ #{} → {} ({})",
                event.transaction_id,
                event.user_email,
                event.message_id.as_deref().unwrap_or("-")
            ),
            ReminderOutcome::Failed => println!(
                "   ❌ #{} → {}: {}",
                event.transaction_id,
                event.user_email,
                event.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    println!();
    println!(
        "Processed {} reminders: {} sent, {} failed",
        summary.processed_count,
        summary.sent_count(),
        summary.failed_count()
    );

    Ok(())
}

/// Send a plain test email or a sample reminder
pub async fn cmd_reminders_test(
    mailer: &dyn EmailSender,
    config: &AppConfig,
    email: &str,
    kind: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        bail!("Email is required");
    }

    let message_id = match kind {
        "test" => mailer.send_test(email).await,
        "reminder" => {
            let today = local_date(now, &config.utc_offset);
            mailer
                .send_reminder(email, &ReminderContent::sample(), today)
                .await
        }
        other => bail!("Unknown email type: {} (use 'test' or 'reminder')", other),
    }
    .with_context(|| format!("Failed to send {} email to {}", kind, email))?;

    println!("✅ Test email sent to {} via {}", email, mailer.name());
    println!("   Message ID: {}", message_id);

    Ok(())
}
