//! Reminder handlers
//!
//! The cron trigger is authorized by bearer secret rather than identity so an
//! external scheduler can call it. Everything else here is admin-only.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::read_json;
use crate::{cron_authorized, require_admin, AppError, AppState};
use budgetly_core::clock::local_date;
use budgetly_core::models::{DispatchSummary, DueReminder, ReminderContent};
use budgetly_core::{find_due_reminders, Clock, EmailSender, Identity, ReminderDispatcher};

#[derive(Serialize)]
pub struct DueRemindersResponse {
    pub reminders: Vec<DueReminder>,
    pub count: usize,
}

/// Dispatch outcome with a human-readable summary line
#[derive(Serialize)]
pub struct CheckRemindersResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub summary: DispatchSummary,
}

/// Request body for the test email endpoint
#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    /// "test" (default) or "reminder"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
}

/// Run one dispatch pass at the current time
async fn run_dispatch(state: &AppState) -> Result<DispatchSummary, AppError> {
    let dispatcher = ReminderDispatcher::new(&state.db, &state.mailer, state.config.utc_offset);
    let summary = dispatcher.dispatch(state.clock.now()).await?;
    Ok(summary)
}

/// GET /api/reminders/due - Preview what the next dispatch would send (admin)
pub async fn list_due_reminders(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DueRemindersResponse>, AppError> {
    require_admin(&identity, &state.config)?;

    let reminders = find_due_reminders(&state.db, state.clock.now(), &state.config.utc_offset)?;

    Ok(Json(DueRemindersResponse {
        count: reminders.len(),
        reminders,
    }))
}

/// POST /api/reminders/check - Send every due reminder now (admin)
pub async fn check_reminders(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<CheckRemindersResponse>, AppError> {
    let admin = require_admin(&identity, &state.config)?;

    let summary = run_dispatch(&state).await?;

    state.db.log_audit(
        admin,
        "dispatch",
        Some("reminder"),
        None,
        Some(&format!(
            "sent={}, failed={}, due={}",
            summary.sent_count(),
            summary.failed_count(),
            summary.total_due
        )),
    )?;

    Ok(Json(CheckRemindersResponse {
        success: true,
        message: format!("Processed {} reminders", summary.processed_count),
        summary,
    }))
}

/// POST /api/reminders/test - Send a test email or a sample reminder (admin)
pub async fn send_test_email(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    request: Request,
) -> Result<Json<TestEmailResponse>, AppError> {
    let admin = require_admin(&identity, &state.config)?.to_string();
    let req: TestEmailRequest = read_json(request).await?;

    let to = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("Email is required"))?;

    let sent = match req.kind.as_deref().unwrap_or("test") {
        "test" => state.mailer.send_test(to).await,
        "reminder" => {
            let today = local_date(state.clock.now(), &state.config.utc_offset);
            state
                .mailer
                .send_reminder(to, &ReminderContent::sample(), today)
                .await
        }
        other => {
            return Err(AppError::bad_request(&format!(
                "Unknown email type: {}",
                other
            )))
        }
    };

    let message_id = match sent {
        Ok(id) => id,
        Err(e) => {
            warn!(to = %to, "Test email failed: {}", e);
            return Err(AppError::internal("Failed to send test email").with_source(e));
        }
    };

    state.db.log_audit(
        &admin,
        "send_test",
        Some("email"),
        None,
        Some(&format!("to={}", to)),
    )?;

    Ok(Json(TestEmailResponse {
        success: true,
        message: "Test email sent successfully".to_string(),
        message_id,
    }))
}

/// GET /api/cron/reminders - Dispatch trigger for an external scheduler
///
/// Requires `Authorization: Bearer <BUDGETLY_CRON_SECRET>` when a secret is set.
pub async fn cron_reminders(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<DispatchSummary>, AppError> {
    if !cron_authorized(request.headers(), state.config.cron_secret.as_deref()) {
        warn!("Cron trigger rejected: bad or missing bearer secret");
        return Err(AppError::unauthorized("Unauthorized"));
    }

    let summary = run_dispatch(&state).await?;

    info!(
        processed = summary.processed_count,
        sent = summary.sent_count(),
        "Cron reminder run finished"
    );

    if let Err(e) = state.db.log_audit(
        "cron",
        "dispatch",
        Some("reminder"),
        None,
        Some(&format!(
            "sent={}, failed={}, due={}",
            summary.sent_count(),
            summary.failed_count(),
            summary.total_due
        )),
    ) {
        warn!("Failed to log cron run to audit: {}", e);
    }

    Ok(Json(summary))
}
