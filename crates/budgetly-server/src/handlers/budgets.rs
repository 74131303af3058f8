//! Budget management handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{require_owner, AppError, AppState, MessageResponse};
use budgetly_core::models::{
    Budget, BudgetUpdate, BudgetWithTotals, NewBudget, SortOrder, Transaction,
};
use budgetly_core::{Database, Identity};

/// Request body for creating a budget
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Request body for updating a budget
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Serialize)]
pub struct BudgetListResponse {
    pub budgets: Vec<BudgetWithTotals>,
}

#[derive(Serialize)]
pub struct BudgetResponse {
    pub budget: Budget,
}

/// A budget with its totals and transactions
#[derive(Serialize)]
pub struct BudgetDetailResponse {
    pub budget: BudgetWithTotals,
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCheckResponse {
    pub has_budgets: bool,
    pub budget_count: i64,
}

/// Load a budget the caller owns; other owners' budgets look missing
fn owned_budget(db: &Database, id: i64, owner: &str) -> Result<Budget, AppError> {
    db.get_budget(id)?
        .filter(|b| b.created_by == owner)
        .ok_or_else(|| AppError::not_found(&format!("Budget {} not found", id)))
}

/// GET /api/budgets - List the caller's budgets with totals, oldest first
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<BudgetListResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let budgets = state.db.list_budgets_with_totals(owner, SortOrder::Asc)?;
    Ok(Json(BudgetListResponse { budgets }))
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    request: Request,
) -> Result<(StatusCode, Json<BudgetResponse>), AppError> {
    let owner = require_owner(&identity)?;
    let req: CreateBudgetRequest = read_json(request).await?;

    let budget = state.db.create_budget(&NewBudget {
        name: req.name,
        amount: req.amount,
        created_by: owner.to_string(),
        category: req.category,
        icon: req.icon,
    })?;

    state.db.log_audit(
        owner,
        "create",
        Some("budget"),
        Some(budget.id),
        Some(&format!("name={}, amount={:.2}", budget.name, budget.amount)),
    )?;

    Ok((StatusCode::CREATED, Json(BudgetResponse { budget })))
}

/// GET /api/budgets/check - Whether the caller has created any budget yet
pub async fn check_budgets(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<BudgetCheckResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let budget_count = state.db.count_budgets(owner)?;
    Ok(Json(BudgetCheckResponse {
        has_budgets: budget_count > 0,
        budget_count,
    }))
}

/// GET /api/budgets/:id - A budget with its totals and transactions
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<BudgetDetailResponse>, AppError> {
    let owner = require_owner(&identity)?;
    owned_budget(&state.db, id, owner)?;

    let budget = state.db.get_budget_with_totals(id)?;
    let transactions = state.db.list_budget_transactions(id)?;

    Ok(Json(BudgetDetailResponse {
        budget,
        transactions,
    }))
}

/// PUT /api/budgets/:id - Update name, amount and icon
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<BudgetResponse>, AppError> {
    let owner = require_owner(&identity)?;
    owned_budget(&state.db, id, owner)?;

    let req: UpdateBudgetRequest = read_json(request).await?;
    let budget = state.db.update_budget(
        id,
        &BudgetUpdate {
            name: req.name,
            amount: req.amount,
            icon: req.icon,
        },
    )?;

    state.db.log_audit(
        owner,
        "update",
        Some("budget"),
        Some(id),
        Some(&format!("name={}, amount={:.2}", budget.name, budget.amount)),
    )?;

    Ok(Json(BudgetResponse { budget }))
}

/// DELETE /api/budgets/:id - Delete a budget and its transactions
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let budget = owned_budget(&state.db, id, owner)?;

    state.db.delete_budget(id)?;

    state.db.log_audit(
        owner,
        "delete",
        Some("budget"),
        Some(id),
        Some(&format!("name={}", budget.name)),
    )?;

    Ok(Json(MessageResponse {
        message: "Budget deleted successfully".to_string(),
    }))
}
