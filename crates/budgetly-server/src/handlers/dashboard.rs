//! Dashboard handler

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Serialize;

use super::PageQuery;
use crate::{require_owner, AppError, AppState};
use budgetly_core::models::{BudgetWithTotals, SortOrder, Transaction};
use budgetly_core::Identity;

/// Everything the dashboard page shows
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Newest budget first
    pub budgets: Vec<BudgetWithTotals>,
    pub transactions: Vec<Transaction>,
    pub total_transactions: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    /// Spending per category label
    pub category_aggregation: BTreeMap<String, f64>,
}

/// GET /api/dashboard - Budgets with totals, a page of transactions, category totals
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PageQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let limit = state.config.page_limit(params.limit);

    let budgets = state.db.list_budgets_with_totals(owner, SortOrder::Desc)?;
    let page = state
        .db
        .transaction_page(owner, params.page.unwrap_or(1), limit)?;
    let category_aggregation = state
        .db
        .category_totals(owner)?
        .into_iter()
        .map(|c| (c.category, c.total_amount))
        .collect();

    Ok(Json(DashboardResponse {
        budgets,
        transactions: page.transactions,
        total_transactions: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
        category_aggregation,
    }))
}
