//! Error types shared across the store, the reply client and the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::session::SessionId;

/// Errors raised by the session store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No session with this id exists in the store.
    #[error("session not found: {0}")]
    NotFound(SessionId),
}

/// Failures talking to the reply service.
///
/// Both variants end up as the same fixed chat bubble; they are kept apart
/// only so the logs say which side of the wire broke.
#[derive(Error, Debug)]
pub enum ReplyError {
    /// The request never produced a response body (connect, TLS, reset, ...).
    #[error("reply service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body arrived but it was not usable JSON.
    #[error("malformed reply body: {0}")]
    MalformedBody(String),
}

/// Errors returned by the JSON API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("template rendering failed: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
