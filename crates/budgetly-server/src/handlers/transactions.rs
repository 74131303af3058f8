//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{read_json, PageQuery};
use crate::{require_owner, AppError, AppState, MessageResponse};
use budgetly_core::models::{CategoryTotal, NewTransaction, Recurrence, Transaction};
use budgetly_core::{Clock, Identity};

/// Request body for logging a transaction
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub name: String,
    pub amount: f64,
    pub budget_id: i64,
    #[serde(default)]
    pub category: Option<String>,
    /// One of none, daily, weekly, monthly, yearly (default none)
    #[serde(default)]
    pub recurring: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub total_transactions: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transaction: Transaction,
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryTotal>,
}

/// GET /api/transactions - One page of the caller's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PageQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let limit = state.config.page_limit(params.limit);

    let page = state
        .db
        .transaction_page(owner, params.page.unwrap_or(1), limit)?;

    Ok(Json(TransactionListResponse {
        transactions: page.transactions,
        total_transactions: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }))
}

/// POST /api/transactions - Log a transaction against one of the caller's budgets
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    request: Request,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let owner = require_owner(&identity)?;
    let req: CreateTransactionRequest = read_json(request).await?;

    let recurring: Recurrence = match req.recurring.as_deref().map(str::trim) {
        None | Some("") => Recurrence::None,
        Some(value) => value.parse()?,
    };

    state
        .db
        .get_budget(req.budget_id)?
        .filter(|b| b.created_by == owner)
        .ok_or_else(|| AppError::not_found(&format!("Budget {} not found", req.budget_id)))?;

    // Due dates are computed in the configured zone
    let now = state.clock.now().with_timezone(&state.config.utc_offset);
    let transaction = state.db.create_transaction(
        &NewTransaction {
            name: req.name,
            amount: req.amount,
            budget_id: req.budget_id,
            category: req.category,
            recurring,
        },
        now,
    )?;

    state.db.log_audit(
        owner,
        "create",
        Some("transaction"),
        Some(transaction.id),
        Some(&format!(
            "budget_id={}, amount={:.2}, recurring={}",
            transaction.budget_id, transaction.amount, transaction.recurring
        )),
    )?;

    Ok((StatusCode::CREATED, Json(TransactionResponse { transaction })))
}

/// DELETE /api/transactions/:id - Delete one of the caller's transactions
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let owner = require_owner(&identity)?;

    if state.db.transaction_owner(id)?.as_deref() != Some(owner) {
        return Err(AppError::not_found(&format!("Transaction {} not found", id)));
    }

    state.db.delete_transaction(id)?;

    state
        .db
        .log_audit(owner, "delete", Some("transaction"), Some(id), None)?;

    Ok(Json(MessageResponse {
        message: "Transaction deleted successfully".to_string(),
    }))
}

/// GET /api/categories - Spending per category across the caller's transactions
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let categories = state.db.category_totals(owner)?;
    Ok(Json(CategoryListResponse { categories }))
}
