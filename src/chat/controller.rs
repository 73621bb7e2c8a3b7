//! Send state machine.

use std::sync::Arc;

use serde::Serialize;

use crate::error::SessionError;
use crate::reply::{Reply, ReplyService};
use crate::session::{Message, Role, SessionId, SessionStore};

/// Bot text recorded when the service answers without usable text.
pub const EMPTY_REPLY_TEXT: &str = "Sorry, no response from API.";

/// Bot text recorded when the service cannot be reached or parsed.
pub const UNREACHABLE_TEXT: &str = "Error: Could not reach the API.";

/// How a send ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// The service answered with text.
    Answered,
    /// The service answered without text; the fallback was recorded.
    EmptyReply,
    /// Transport or parse failure; the error text was recorded.
    Failed,
}

/// Everything a completed send recorded.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    /// Session the send was issued from (and the reply was written to).
    pub session_id: SessionId,
    pub user: Message,
    pub reply: Message,
    pub status: SendStatus,
}

/// Result of a send action.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing was recorded or sent.
    Ignored,
    /// The user message and a bot message were recorded.
    Delivered(SendReport),
}

impl SendOutcome {
    pub fn report(&self) -> Option<&SendReport> {
        match self {
            Self::Ignored => None,
            Self::Delivered(report) => Some(report),
        }
    }
}

/// Coordinates the session store and the reply service.
///
/// Cloning is cheap; clones share the store and the service.
#[derive(Debug, Clone)]
pub struct ChatController {
    store: SessionStore,
    replies: Arc<dyn ReplyService>,
}

impl ChatController {
    pub fn new(store: SessionStore, replies: Arc<dyn ReplyService>) -> Self {
        Self { store, replies }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Validate `raw` and record it in the active session.
    ///
    /// Returns `None` for blank input. The first session is created on
    /// demand if the store is still empty.
    pub fn submit(&self, raw: &str) -> Result<Option<PendingReply>, SessionError> {
        let Some(input) = validate(raw) else {
            return Ok(None);
        };
        let session_id = self.store.ensure_active();
        self.record(session_id, input).map(Some)
    }

    /// Validate `raw` and record it in a specific session.
    pub fn submit_to(
        &self,
        session_id: &SessionId,
        raw: &str,
    ) -> Result<Option<PendingReply>, SessionError> {
        let Some(input) = validate(raw) else {
            return Ok(None);
        };
        self.record(session_id.clone(), input).map(Some)
    }

    /// Submit to the active session and wait for the reply.
    pub async fn send(&self, raw: &str) -> Result<SendOutcome, SessionError> {
        match self.submit(raw)? {
            Some(pending) => Ok(SendOutcome::Delivered(pending.resolve().await)),
            None => Ok(SendOutcome::Ignored),
        }
    }

    /// Submit to a specific session and wait for the reply.
    pub async fn send_to(
        &self,
        session_id: &SessionId,
        raw: &str,
    ) -> Result<SendOutcome, SessionError> {
        match self.submit_to(session_id, raw)? {
            Some(pending) => Ok(SendOutcome::Delivered(pending.resolve().await)),
            None => Ok(SendOutcome::Ignored),
        }
    }

    fn record(&self, session_id: SessionId, input: &str) -> Result<PendingReply, SessionError> {
        self.store.append_message(&session_id, Role::User, input)?;

        tracing::info!(
            name: "chat.send.submitted",
            session_id = %session_id,
            input_length = input.len(),
            "User message recorded"
        );

        Ok(PendingReply {
            store: self.store.clone(),
            replies: Arc::clone(&self.replies),
            session_id,
            user: Message::user(input),
        })
    }
}

fn validate(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::trace!("Ignoring blank input");
        None
    } else {
        Some(trimmed)
    }
}

/// A recorded user message whose reply has not been fetched yet.
///
/// The session is pinned at submit time, so the reply lands in the session
/// that asked even if another one is made active in the meantime.
#[derive(Debug)]
#[must_use = "the reply is only fetched and recorded by `resolve`"]
pub struct PendingReply {
    store: SessionStore,
    replies: Arc<dyn ReplyService>,
    session_id: SessionId,
    user: Message,
}

impl PendingReply {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The trimmed input that will be sent.
    pub fn input(&self) -> &str {
        &self.user.text
    }

    /// Issue the outbound request and record the bot message.
    ///
    /// Never fails: service errors become a fixed bot message.
    pub async fn resolve(self) -> SendReport {
        let (status, text) = match self.replies.ask(&self.user.text).await {
            Ok(Reply::Text(text)) => (SendStatus::Answered, text),
            Ok(Reply::Empty) => (SendStatus::EmptyReply, EMPTY_REPLY_TEXT.to_string()),
            Err(e) => {
                tracing::warn!(
                    name: "reply.request.failed",
                    session_id = %self.session_id,
                    error = %e,
                    "Reply service failed"
                );
                (SendStatus::Failed, UNREACHABLE_TEXT.to_string())
            }
        };

        if let Err(e) = self
            .store
            .append_message(&self.session_id, Role::Bot, text.clone())
        {
            tracing::warn!(error = %e, "Dropping reply for unknown session");
        }

        tracing::info!(
            name: "chat.send.completed",
            session_id = %self.session_id,
            status = ?status,
            "Bot message recorded"
        );

        SendReport {
            session_id: self.session_id,
            user: self.user,
            reply: Message::bot(text),
            status,
        }
    }
}
