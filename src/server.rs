//! HTTP surface: HTML pages, form posts and the JSON API.
//!
//! Endpoints:
//! - GET / - Chat page (`?layout=single|sidebar` overrides the default)
//! - POST /chat/send, /chat/new, /chat/{id}/open - Form posts, redirect back
//! - POST /api/chat - Send an input, returns the send outcome
//! - GET /api/messages - Active transcript
//! - GET|POST /api/sessions - List or create sessions
//! - POST /api/sessions/{id}/activate - Switch the active session
//! - GET /api/sessions/{id}/messages - Transcript of one session
//! - GET /healthz - Liveness

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::chat::SendOutcome;
use crate::config::AppConfig;
use crate::error::{ApiError, SessionError};
use crate::reply::HttpReplyClient;
use crate::session::{Message, SessionId, SessionSummary};
use crate::ui::{ChatPage, Layout};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/healthz", get(healthz))
        .route("/chat/send", post(form_send))
        .route("/chat/new", post(form_new_session))
        .route("/chat/{id}/open", post(form_open_session))
        .route("/api/chat", post(api_chat))
        .route("/api/messages", get(api_active_messages))
        .route(
            "/api/sessions",
            get(api_list_sessions).post(api_create_session),
        )
        .route("/api/sessions/{id}/activate", post(api_activate_session))
        .route("/api/sessions/{id}/messages", get(api_get_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "reply.config.loaded",
        endpoint = %config.reply.endpoint,
        "Reply service configured"
    );

    let replies = Arc::new(HttpReplyClient::new(config.reply.endpoint.clone()));
    let state = AppState::new(Arc::clone(&config), replies)
        .context("Failed to compile page templates")?;
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        layout = %config.ui.layout,
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    layout: Option<Layout>,
}

/// Form fields shared by the session buttons.
#[derive(Debug, Deserialize)]
struct LayoutForm {
    #[serde(default)]
    layout: Option<Layout>,
}

/// Form fields of the message box.
#[derive(Debug, Deserialize)]
struct SendForm {
    #[serde(default)]
    input: String,
    /// Session the page was showing when the form was submitted.
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    layout: Option<Layout>,
}

/// GET / - Render the chat page.
async fn index_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let layout = query.layout.unwrap_or(state.config.ui.layout);
    render_page(&state, layout).map(Html)
}

/// POST /chat/send - Send the message box contents, then show the page again.
async fn form_send(
    State(state): State<AppState>,
    Form(form): Form<SendForm>,
) -> Result<Redirect, ApiError> {
    let outcome = match requested_session(form.session_id) {
        Some(id) => state.chat.send_to(&id, &form.input).await?,
        None => state.chat.send(&form.input).await?,
    };
    tracing::debug!(delivered = outcome.report().is_some(), "Form send handled");
    Ok(back_to_page(form.layout))
}

/// POST /chat/new - Start a new chat.
async fn form_new_session(
    State(state): State<AppState>,
    Form(form): Form<LayoutForm>,
) -> Redirect {
    let id = state.sessions().create_session();
    info!(session_id = %id, "Created new session");
    back_to_page(form.layout)
}

/// POST /chat/{id}/open - Switch to another chat.
async fn form_open_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<LayoutForm>,
) -> Result<Redirect, ApiError> {
    state.sessions().set_active(&SessionId::from(id))?;
    Ok(back_to_page(form.layout))
}

fn render_page(state: &AppState, layout: Layout) -> Result<String, ApiError> {
    let store = state.sessions();
    let active = store.ensure_active();
    let sessions = store.sessions();
    let messages = store.messages(&active).unwrap_or_default();

    let html = state.pages.render(&ChatPage {
        title: &state.config.ui.title,
        layout,
        sessions: &sessions,
        active_id: Some(&active),
        messages: &messages,
    })?;
    Ok(html)
}

fn back_to_page(layout: Option<Layout>) -> Redirect {
    match layout {
        Some(layout) => Redirect::to(&format!("/?layout={layout}")),
        None => Redirect::to("/"),
    }
}

/// Blank ids mean "whatever is active".
fn requested_session(id: Option<String>) -> Option<SessionId> {
    id.filter(|id| !id.trim().is_empty()).map(SessionId::from)
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// Raw user input; trimmed by the controller.
    #[serde(default)]
    input: String,
    /// Optional target session (the active one if omitted).
    #[serde(default)]
    session_id: Option<String>,
}

/// POST /api/chat - Send an input and wait for the reply.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SendOutcome>, ApiError> {
    tracing::info!(
        input_length = req.input.len(),
        session_id = ?req.session_id,
        "Received chat request"
    );

    let outcome = match requested_session(req.session_id) {
        Some(id) => state.chat.send_to(&id, &req.input).await?,
        None => state.chat.send(&req.input).await?,
    };
    Ok(Json(outcome))
}

/// GET /api/messages - Transcript of the active session.
async fn api_active_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.sessions().active_messages())
}

/// GET /api/sessions - List all sessions.
async fn api_list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.sessions().sessions())
}

/// POST /api/sessions - Create a new session and make it active.
async fn api_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionSummary>), ApiError> {
    let store = state.sessions();
    let id = store.create_session();
    let summary = store
        .summary(&id)
        .ok_or(SessionError::NotFound(id))?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// POST /api/sessions/:id/activate - Switch the active session.
async fn api_activate_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions().set_active(&SessionId::from(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/messages - Get session messages.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let id = SessionId::from(id);
    state
        .sessions()
        .messages(&id)
        .map(Json)
        .ok_or_else(|| SessionError::NotFound(id).into())
}

/// GET /healthz - Liveness probe.
async fn healthz() -> &'static str {
    "ok"
}
