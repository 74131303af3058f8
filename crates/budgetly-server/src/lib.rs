//! Budgetly Web Server
//!
//! Axum-based REST API for the Budgetly personal finance dashboard.
//!
//! Security features:
//! - Identity taken from the authenticating proxy's user header
//! - Admin allowlist for reminder operations
//! - Constant-time bearer check on the cron trigger
//! - Restrictive CORS policy and security headers
//! - Audit logging for every mutation
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use budgetly_core::{
    AdvisorBackend, AdvisorClient, AppConfig, Clock, Database, EmailSender, Identity, Mailer,
    SystemClock,
};

mod handlers;
mod scheduler;

pub use scheduler::{start_reminder_scheduler, ReminderScheduleConfig};

/// Header set by the authenticating proxy with the signed-in user's email
pub const USER_EMAIL_HEADER: &str = "x-authenticated-user-email";

/// Authorization header for the cron bearer secret
const AUTHORIZATION_HEADER: &str = "authorization";

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub mailer: Mailer,
    /// None when no advisor backend is configured
    pub advisor: Option<AdvisorClient>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Build state from configuration, with the real clock
    pub fn new(db: Database, config: AppConfig) -> budgetly_core::Result<Self> {
        let mailer = Mailer::from_config(&config.mail)?;
        let advisor = AdvisorClient::from_config(&config);

        Ok(Self {
            db,
            config,
            mailer,
            advisor,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock (for testing)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the email sender (for testing)
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = mailer;
        self
    }

    /// Replace the advisor (for testing)
    pub fn with_advisor(mut self, advisor: Option<AdvisorClient>) -> Self {
        self.advisor = advisor;
        self
    }
}

/// Identity middleware - resolves the caller once and stores it in request extensions
///
/// Requests without the proxy header continue as `Identity::Anonymous`; handlers
/// that need an owner reject them with 401.
async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let identity = Identity::from_email(
        request
            .headers()
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    match &identity {
        Identity::Authenticated { email } => {
            debug!(user = %email, path = %request.uri().path(), "Authenticated via proxy header")
        }
        Identity::Anonymous => debug!(path = %request.uri().path(), "Anonymous request"),
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Check the cron bearer secret using constant-time comparison
///
/// With no secret configured the trigger is open.
pub(crate) fn cron_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    use subtle::ConstantTimeEq;

    let Some(secret) = secret else {
        return true;
    };

    let provided = headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));

    match provided {
        // Only compare if lengths match (constant-time for same-length secrets)
        Some(provided) if provided.len() == secret.len() => {
            provided.as_bytes().ct_eq(secret.as_bytes()).into()
        }
        _ => false,
    }
}

/// The caller's email, or 401 for anonymous requests
pub(crate) fn require_owner(identity: &Identity) -> Result<&str, AppError> {
    identity
        .email()
        .map_err(|_| AppError::unauthorized("Authentication required"))
}

/// The caller's email if they are on the admin allowlist
pub(crate) fn require_admin<'a>(
    identity: &'a Identity,
    config: &AppConfig,
) -> Result<&'a str, AppError> {
    let email = require_owner(identity)?;
    if !identity.is_admin(config) {
        warn!(user = %email, "Admin access denied");
        return Err(AppError::forbidden("Admin access required"));
    }
    Ok(email)
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Message response for deletions
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Auth
        .route("/me", get(handlers::get_me))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route("/budgets/check", get(handlers::check_budgets))
        .route(
            "/budgets/:id",
            get(handlers::get_budget)
                .put(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/:id", delete(handlers::delete_transaction))
        .route("/categories", get(handlers::list_categories))
        // Reminders
        .route("/reminders/due", get(handlers::list_due_reminders))
        .route("/reminders/check", post(handlers::check_reminders))
        .route("/reminders/test", post(handlers::send_test_email))
        .route("/cron/reminders", get(handlers::cron_reminders))
        // AI advisor
        .route("/ai/insights", get(handlers::get_insights))
        .route("/ai/chat", post(handlers::chat))
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    // Restrictive default: only allow same-origin
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // CSP: restrict scripts to same-origin, allow inline styles, allow data: for images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn(identity_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the dashboard frontend if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    config: AppConfig,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    let state = AppState::new(db, config)?;

    if state.config.admin_emails.is_empty() {
        warn!("No admin emails configured - reminder endpoints are unavailable");
    }
    if state.config.cron_secret.is_none() {
        warn!("BUDGETLY_CRON_SECRET not set - the cron trigger is open to anyone");
    }
    info!(mailer = state.mailer.name(), "Email sender configured");

    check_ai_connection(state.advisor.as_ref()).await;

    let app_state = Arc::new(state);

    // Start the reminder scheduler if configured
    if let Some(schedule) = ReminderScheduleConfig::from_config(&app_state.config) {
        start_reminder_scheduler(app_state.clone(), schedule);
    }

    let app = create_router(app_state, static_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(advisor: Option<&AdvisorClient>) {
    match advisor {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("AI backend not configured (set OPENAI_COMPATIBLE_HOST to enable AI features)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    /// Attach the underlying error for logging
    pub fn with_source(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.internal = Some(err.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, status = %self.status, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message, everything else is sanitized
        if let Some(core) = err.downcast_ref::<budgetly_core::Error>() {
            use budgetly_core::Error as CoreError;
            match core {
                CoreError::NotFound(what) => {
                    return Self::not_found(&format!("{} not found", capitalize(what)))
                }
                CoreError::InvalidData(msg) => return Self::bad_request(msg),
                CoreError::InvalidPeriod(period) => {
                    return Self::bad_request(&format!("Invalid recurrence period: {}", period))
                }
                CoreError::MissingOwner => return Self::bad_request("Owner email is required"),
                _ => {}
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
