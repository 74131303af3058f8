//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod ai;
pub mod audit;
pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod health;
pub mod reminders;
pub mod transactions;

// Re-export all handlers for use in router
pub use ai::*;
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use dashboard::*;
pub use health::*;
pub use reminders::*;
pub use transactions::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::AppError;

/// Largest JSON body any handler accepts (10 KB)
const MAX_JSON_BODY: usize = 1024 * 10;

/// Pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Read and parse a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}
