//! Reply service abstraction.
//!
//! The reply service is the external collaborator that turns user text into a
//! response string. [`ReplyService`] is the seam the chat controller talks to;
//! [`HttpReplyClient`] is the production implementation.
//!
//! # Wire contract
//!
//! - `POST <endpoint>` with `Content-Type: application/json`
//! - body `{ "input": "<trimmed user text>" }`
//! - response: JSON with an optional string field `text`

mod http;

pub use http::HttpReplyClient;

use crate::error::ReplyError;

/// Outcome of a successful exchange with the reply service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The service answered with usable text.
    Text(String),
    /// The service answered, but without a usable `text` field.
    Empty,
}

impl Reply {
    /// Interpret a decoded response body.
    ///
    /// Only a non-empty string `text` counts as an answer. A JSON `null` body
    /// is treated as malformed, every other shape as an empty reply.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, ReplyError> {
        if body.is_null() {
            return Err(ReplyError::MalformedBody("body is null".to_string()));
        }

        Ok(body
            .get("text")
            .and_then(serde_json::Value::as_str)
            .filter(|text| !text.is_empty())
            .map_or(Self::Empty, |text| Self::Text(text.to_string())))
    }

    /// Interpret a raw response body.
    pub fn from_body(bytes: &[u8]) -> Result<Self, ReplyError> {
        let body: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ReplyError::MalformedBody(e.to_string()))?;
        Self::from_json(&body)
    }
}

/// Something that can answer a chat input.
#[async_trait::async_trait]
pub trait ReplyService: Send + Sync + std::fmt::Debug {
    /// Send one input and wait for the service's answer.
    async fn ask(&self, input: &str) -> Result<Reply, ReplyError>;
}
