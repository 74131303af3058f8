//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use budgetly_core::AppConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: AppConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Budgetly web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    if config.admin_emails.is_empty() {
        println!("   ⚠️  No admins configured (BUDGETLY_ADMIN_EMAILS) - reminder endpoints disabled");
    } else {
        println!("   👤 Admins: {}", config.admin_emails.join(", "));
    }
    if config.cron_secret.is_some() {
        println!("   🔒 Cron trigger: bearer secret required");
    } else {
        println!("   ⚠️  Cron trigger: OPEN (set BUDGETLY_CRON_SECRET)");
    }
    println!("   🕒 Time zone: UTC{}", config.utc_offset);
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    budgetly_server::serve(db, config, host, port, static_dir_str).await?;

    Ok(())
}
