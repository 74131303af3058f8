//! Health check handler

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::AppState;
use budgetly_core::{Clock, EmailSender};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub checks: HealthChecks,
}

/// Individual component checks
#[derive(Serialize)]
pub struct HealthChecks {
    /// "healthy" or "unhealthy"
    pub database: &'static str,
    /// Active email sender
    pub mail: String,
    /// "configured" or "disabled"
    pub advisor: &'static str,
}

/// GET /api/health - Database probe and configuration summary
///
/// Returns 503 when the database cannot be reached. Responses are never cached.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.db.ping() {
        Ok(()) => "healthy",
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            "unhealthy"
        }
    };

    let healthy = database == "healthy";
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        timestamp: state.clock.now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            database,
            mail: state.mailer.name().to_string(),
            advisor: if state.advisor.is_some() {
                "configured"
            } else {
                "disabled"
            },
        },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        [
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (header::EXPIRES, HeaderValue::from_static("0")),
        ],
        Json(body),
    )
        .into_response()
}
