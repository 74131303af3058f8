//! Status command implementation

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};

use budgetly_core::config::MailBackend;
use budgetly_core::{find_due_reminders, AppConfig};

use super::open_db;

pub fn cmd_status(db_path: &Path, config: &AppConfig, now: DateTime<Utc>) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Budgetly Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Configuration summary
    println!();
    println!("   Time zone: UTC{}", config.utc_offset);
    println!("   Page size: {}", config.page_size);
    println!("   Admins: {}", config.admin_emails.len());
    if config.cron_secret.is_some() {
        println!("   🔒 Cron trigger: secret set");
    } else {
        println!("   ⚠️  Cron trigger: open (BUDGETLY_CRON_SECRET not set)");
    }
    let mail = match config.mail.backend {
        MailBackend::Http => config.mail.api_url.as_deref().unwrap_or("http (no URL)"),
        MailBackend::Log => "log only",
        MailBackend::Mock => "mock",
    };
    println!("   Mail: {}", mail);
    match &config.ai {
        Some(ai) => println!("   🤖 Advisor: {} ({}, {})", ai.host, ai.backend, ai.model),
        None => println!("   Advisor: disabled"),
    }

    // Try to open the database and show stats
    if db_path.exists() {
        match open_db(db_path) {
            Ok(db) => {
                if let Ok(stats) = db.stats() {
                    println!();
                    println!("   Owners: {}", stats.owners);
                    println!("   Budgets: {}", stats.budgets);
                    println!(
                        "   Transactions: {} ({} recurring)",
                        stats.transactions, stats.recurring_transactions
                    );
                }
                if let Ok(due) = find_due_reminders(&db, now, &config.utc_offset) {
                    println!("   🔔 Reminders due today: {}", due.len());
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
            }
        }
    }

    println!();
    Ok(())
}
