//! Chat sessions and the in-memory store that owns them.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Message, Role};
use crate::error::SessionError;

/// Opaque session identifier.
///
/// Freshly generated ids are UUIDv7 strings, so they sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new time-ordered id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single chat transcript. Only the store touches it; callers see
/// transcripts and [`SessionSummary`] snapshots.
#[derive(Debug)]
struct Session {
    id: SessionId,
    /// Display name shown in the sidebar (`Chat 1`, `Chat 2`, ...).
    name: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new(id: SessionId, name: String) -> Self {
        Self {
            id,
            name,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Read-only projection of a session used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
    pub message_count: usize,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe, ordered store of chat sessions.
///
/// Clones share the same underlying sessions. Exactly one session is active
/// once the store holds any session at all.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Sessions in creation order.
    sessions: Vec<Session>,
    active: Option<SessionId>,
}

impl StoreInner {
    fn find(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    fn find_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }

    fn summarize(&self, session: &Session) -> SessionSummary {
        SessionSummary {
            id: session.id.clone(),
            name: session.name.clone(),
            message_count: session.messages.len(),
            active: self.active.as_ref() == Some(&session.id),
            created_at: session.created_at,
        }
    }

    fn create(&mut self) -> SessionId {
        let mut id = SessionId::generate();
        while self.find(&id).is_some() {
            id = SessionId::generate();
        }
        let name = format!("Chat {}", self.sessions.len() + 1);
        self.sessions.push(Session::new(id.clone(), name));
        self.active = Some(id.clone());
        id
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Sessions are append-only, so a panic in another holder cannot leave
    // them half-written; recover the guard instead of propagating poison.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an empty session, make it active and return its id.
    pub fn create_session(&self) -> SessionId {
        self.write().create()
    }

    /// Return the active session id, creating the first session if the
    /// store is still empty.
    pub fn ensure_active(&self) -> SessionId {
        let mut guard = self.write();
        if let Some(id) = &guard.active {
            return id.clone();
        }
        guard.create()
    }

    /// Append a message to the given session.
    ///
    /// Unknown ids are rejected with [`SessionError::NotFound`] and leave the
    /// store untouched.
    pub fn append_message(
        &self,
        session_id: &SessionId,
        role: Role,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut guard = self.write();
        let session = guard
            .find_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
        session.messages.push(Message::new(role, text));
        Ok(())
    }

    /// Transcript of the active session, empty when nothing is active yet.
    pub fn active_messages(&self) -> Vec<Message> {
        let guard = self.read();
        guard
            .active
            .as_ref()
            .and_then(|id| guard.find(id))
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.read().active.clone()
    }

    /// Switch the active session. Unknown ids leave the active one in place.
    pub fn set_active(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.write();
        if guard.find(session_id).is_none() {
            return Err(SessionError::NotFound(session_id.clone()));
        }
        guard.active = Some(session_id.clone());
        Ok(())
    }

    /// Transcript of a specific session.
    pub fn messages(&self, session_id: &SessionId) -> Option<Vec<Message>> {
        self.read().find(session_id).map(|s| s.messages.clone())
    }

    /// Summaries of every session, in creation order.
    pub fn sessions(&self) -> Vec<SessionSummary> {
        let guard = self.read();
        guard.sessions.iter().map(|s| guard.summarize(s)).collect()
    }

    pub fn summary(&self, session_id: &SessionId) -> Option<SessionSummary> {
        let guard = self.read();
        guard.find(session_id).map(|s| guard.summarize(s))
    }

    pub fn len(&self) -> usize {
        self.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
