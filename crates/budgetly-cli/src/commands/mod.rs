//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `advisor` - AI advisor tips and questions
//! - `budgets` - Budget listing
//! - `core` - Init and shared utilities (open_db)
//! - `reminders` - Reminder preview, dispatch and test email
//! - `serve` - Web server command
//! - `status` - Database and configuration status
//! - `transactions` - Transaction listing

pub mod advisor;
pub mod budgets;
pub mod core;
pub mod reminders;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use advisor::*;
pub use budgets::*;
pub use core::*;
pub use reminders::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
