//! Budgetly CLI - Personal finance dashboard
//!
//! Usage:
//!   budgetly init                       Initialize database
//!   budgetly serve --port 3000          Start web server
//!   budgetly budgets --owner EMAIL      List budgets
//!   budgetly reminders run              Send due reminders

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budgetly_core::{AdvisorClient, AppConfig, Clock, Mailer, SystemClock};
use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let now = SystemClock.now();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, config, &host, port, static_dir.as_deref()).await,
        Commands::Budgets { owner } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_budgets_list(&db, &owner)
        }
        Commands::Transactions { owner, page, limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, &owner, page, limit.unwrap_or(config.page_size))
        }
        Commands::Reminders { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                RemindersAction::Due => commands::cmd_reminders_due(&db, &config, now),
                RemindersAction::Run { json } => {
                    let mailer =
                        Mailer::from_config(&config.mail).context("Failed to set up mailer")?;
                    commands::cmd_reminders_run(&db, &mailer, &config, now, json).await
                }
                RemindersAction::Test { email, kind } => {
                    let mailer =
                        Mailer::from_config(&config.mail).context("Failed to set up mailer")?;
                    commands::cmd_reminders_test(&mailer, &config, &email, &kind, now).await
                }
            }
        }
        Commands::Tips { owner, question } => {
            let db = commands::open_db(&cli.db)?;
            let advisor = AdvisorClient::from_config(&config);
            commands::cmd_tips(&db, advisor.as_ref(), &owner, question.as_deref(), now).await
        }
        Commands::Status => commands::cmd_status(&cli.db, &config, now),
    }
}
