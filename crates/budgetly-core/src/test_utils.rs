//! Test utilities for budgetly-core
//!
//! Mock HTTP servers standing in for the chat-completion API and the
//! transactional mail relay, for integration tests and local development.

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Bind to a free port and serve `app` until the returned sender fires
async fn spawn_server(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

// =============================================================================
// Chat-completion server
// =============================================================================

/// Mock OpenAI-compatible chat server
pub struct MockChatServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat));

        let (addr, shutdown_tx) = spawn_server(app).await;
        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Serialize)]
struct ChatChoice {
    index: u32,
    message: ChatMessage,
    finish_reason: String,
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{ "id": "gpt-3.5-turbo", "object": "model" }]
    }))
}

/// Answers tip requests with a bulleted list and everything else with prose
async fn handle_chat(Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    let content = if prompt.contains("actionable money tips") {
        "• Track your spending every week\n\n• Cook at home more often\n• Automate your savings\n"
            .to_string()
    } else if let Some(question) = prompt.split("My question: ").nth(1) {
        format!("Mock advice for: {}", question.trim())
    } else {
        "Your spending is on track. Keep an eye on dining out.".to_string()
    };

    Json(ChatResponse {
        model: request.model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop".to_string(),
        }],
    })
}

// =============================================================================
// Mail relay
// =============================================================================

/// A message the mock relay accepted
#[derive(Debug, Clone, Deserialize)]
pub struct RelayedEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Authorization header value, if any
    #[serde(skip)]
    pub authorization: Option<String>,
}

#[derive(Default)]
struct RelayState {
    received: Vec<RelayedEmail>,
    rejected: HashSet<String>,
}

/// Mock transactional mail relay
///
/// Accepts `POST /emails` and answers `{"id": "relay-N"}`. Recipients passed
/// to [`MockMailRelay::reject`] get a 422 instead.
pub struct MockMailRelay {
    addr: SocketAddr,
    state: Arc<Mutex<RelayState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockMailRelay {
    /// Start the mock relay on an available port
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(RelayState::default()));
        let app = Router::new()
            .route("/emails", post(handle_email))
            .with_state(state.clone());

        let (addr, shutdown_tx) = spawn_server(app).await;
        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Endpoint to configure as the relay URL
    pub fn url(&self) -> String {
        format!("http://{}/emails", self.addr)
    }

    /// Fail every delivery to `recipient`
    pub fn reject(&self, recipient: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected
            .insert(recipient.to_string());
    }

    /// Everything accepted so far, in order
    pub fn received(&self) -> Vec<RelayedEmail> {
        self.state.lock().unwrap().received.clone()
    }

    /// Stop the mock relay
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockMailRelay {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_email(
    State(state): State<Arc<Mutex<RelayState>>>,
    headers: HeaderMap,
    Json(mut email): Json<RelayedEmail>,
) -> impl IntoResponse {
    email.authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut state = state.lock().unwrap();
    if state.rejected.contains(&email.to) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "recipient rejected" })),
        );
    }

    state.received.push(email);
    let id = format!("relay-{}", state.received.len());
    (StatusCode::OK, Json(serde_json::json!({ "id": id })))
}
