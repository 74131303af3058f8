//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{require_admin, AppError, AppState};
use budgetly_core::config::MAX_PAGE_SIZE;
use budgetly_core::{AuditEntry, Identity};

/// Query parameters for audit log
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    50
}

/// GET /api/audit - List audit log entries (admin)
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require_admin(&identity, &state.config)?;
    let limit = params.limit.clamp(1, MAX_PAGE_SIZE);

    let entries = state.db.list_audit_log(limit)?;

    Ok(Json(entries))
}
