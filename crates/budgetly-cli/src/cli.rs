//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Budgetly - Personal finance dashboard
#[derive(Parser)]
#[command(name = "budgetly")]
#[command(about = "Self-hosted budgets, transactions and recurring-payment reminders", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "budgetly.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing the dashboard frontend (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// List an owner's budgets with spending totals
    Budgets {
        /// Owner email
        #[arg(short, long)]
        owner: String,
    },

    /// List an owner's transactions, newest first
    Transactions {
        /// Owner email
        #[arg(short, long)]
        owner: String,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: i64,

        /// Transactions per page (defaults to BUDGETLY_PAGE_SIZE)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Recurring-transaction reminders
    Reminders {
        #[command(subcommand)]
        action: RemindersAction,
    },

    /// Ask the AI advisor about an owner's finances
    Tips {
        /// Owner email
        #[arg(short, long)]
        owner: String,

        /// Question to ask instead of general insights
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Show database and configuration status
    Status,
}

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Preview reminders that would be sent now (sends nothing)
    Due,

    /// Send every due reminder
    Run {
        /// Print the dispatch summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a test email through the configured mail backend
    Test {
        /// Recipient
        #[arg(short, long)]
        email: String,

        /// Email type: test or reminder
        #[arg(short, long, default_value = "test")]
        kind: String,
    },
}
