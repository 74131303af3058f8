//! AI advisor handlers
//!
//! Insights degrade to fixed fallback text and tips when the advisor is
//! missing or fails, so the advisor page always renders.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::read_json;
use crate::{require_owner, AppError, AppState};
use budgetly_core::ai::{fallback_tips, FALLBACK_INSIGHTS};
use budgetly_core::models::{BudgetUtilization, CategoryTotal, FinancialSummary};
use budgetly_core::{AdvisorBackend, Clock, Identity};

/// The parts of the snapshot shown next to the advice
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    pub summary: FinancialSummary,
    pub budgets: Vec<BudgetUtilization>,
    pub category_spending: Vec<CategoryTotal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub success: bool,
    pub financial_data: FinancialData,
    pub ai_insights: String,
    pub quick_tips: Vec<String>,
    /// False when the text above is the fallback
    pub ai_enabled: bool,
    pub timestamp: String,
}

/// Request body for the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining_budget: f64,
    pub utilization_percentage: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub financial_summary: ChatSummary,
    pub timestamp: String,
}

/// GET /api/ai/insights - Snapshot plus advisor insights and quick tips
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<InsightsResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let now = state.clock.now();
    let snapshot = state.db.financial_snapshot(owner, now)?;

    let (ai_insights, quick_tips, ai_enabled) = match &state.advisor {
        Some(advisor) => {
            let insights = match advisor.financial_insights(&snapshot, None).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(user = %owner, "Advisor insights failed: {}", e);
                    None
                }
            };
            let tips = match advisor.quick_tips(&snapshot).await {
                Ok(tips) if !tips.is_empty() => Some(tips),
                Ok(_) => None,
                Err(e) => {
                    warn!(user = %owner, "Advisor tips failed: {}", e);
                    None
                }
            };
            let enabled = insights.is_some();
            (
                insights.unwrap_or_else(|| FALLBACK_INSIGHTS.to_string()),
                tips.unwrap_or_else(fallback_tips),
                enabled,
            )
        }
        None => (FALLBACK_INSIGHTS.to_string(), fallback_tips(), false),
    };

    Ok(Json(InsightsResponse {
        success: true,
        financial_data: FinancialData {
            summary: snapshot.summary,
            budgets: snapshot.budgets,
            category_spending: snapshot.category_spending,
        },
        ai_insights,
        quick_tips,
        ai_enabled,
        timestamp: now.to_rfc3339(),
    }))
}

/// POST /api/ai/chat - Answer a question about the caller's finances
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    request: Request,
) -> Result<Json<ChatResponse>, AppError> {
    let owner = require_owner(&identity)?;
    let req: ChatRequest = read_json(request).await?;

    let question = req
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("Question is required"))?;

    let advisor = state
        .advisor
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI advisor is not configured"))?;

    let now = state.clock.now();
    let snapshot = state.db.financial_snapshot(owner, now)?;

    let response = advisor
        .financial_insights(&snapshot, Some(question))
        .await
        .map_err(|e| AppError::internal("Failed to process your question").with_source(e))?;

    let s = &snapshot.summary;
    Ok(Json(ChatResponse {
        success: true,
        response,
        financial_summary: ChatSummary {
            total_budget: s.total_budget,
            total_spent: s.total_spent,
            remaining_budget: s.remaining_budget,
            utilization_percentage: s.budget_utilization_percentage,
        },
        timestamp: now.to_rfc3339(),
    }))
}
