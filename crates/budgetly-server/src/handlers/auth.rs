//! Authentication-related handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Serialize;

use crate::AppState;
use budgetly_core::Identity;

/// Response for the /api/me endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// The signed-in user's email, None for anonymous requests
    pub user: Option<String>,
    pub authenticated: bool,
    pub is_admin: bool,
}

/// GET /api/me - Who the proxy says is calling
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<MeResponse> {
    Json(MeResponse {
        user: identity.email().ok().map(str::to_string),
        authenticated: identity.is_authenticated(),
        is_admin: identity.is_admin(&state.config),
    })
}
