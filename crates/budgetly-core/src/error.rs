//! Error types for Budgetly

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid recurrence period: {0}")]
    InvalidPeriod(String),

    #[error("Owner email is required")]
    MissingOwner,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("AI backend error: {0}")]
    Ai(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
