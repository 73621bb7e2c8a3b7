//! AI Fellowship Chat
//!
//! A minimal chat front end: it collects user text, forwards it to an
//! external reply service and keeps an in-memory history of chat sessions.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server rendering HTML pages and a small JSON API
//! - **Session store**: ordered, in-memory, append-only transcripts
//! - **Chat controller**: the send state machine (validate, record, ask, record)
//! - **Reply service**: trait seam over the outbound HTTP call
//!
//! # Modules
//!
//! - [`chat`]: send state machine
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`reply`]: reply service trait and HTTP client
//! - [`session`]: sessions, messages and the store
//! - [`ui`]: single-pane and sidebar page layouts

pub mod chat;
pub mod config;
pub mod error;
pub mod reply;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod ui;

use std::sync::Arc;

use crate::chat::ChatController;
use crate::config::AppConfig;
use crate::reply::ReplyService;
use crate::session::SessionStore;
use crate::ui::PageRenderer;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Send controller; owns the session store.
    pub chat: ChatController,
    /// Compiled page templates.
    pub pages: Arc<PageRenderer>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build the state with a fresh store holding one active session.
    pub fn new(
        config: Arc<AppConfig>,
        replies: Arc<dyn ReplyService>,
    ) -> Result<Self, minijinja::Error> {
        let sessions = SessionStore::new();
        let first = sessions.ensure_active();
        tracing::debug!(session_id = %first, "Initial session created");

        Ok(Self {
            chat: ChatController::new(sessions, replies),
            pages: Arc::new(PageRenderer::new()?),
            config,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        self.chat.store()
    }
}
