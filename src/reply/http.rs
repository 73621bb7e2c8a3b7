//! HTTP client for the reply service.

use serde::Serialize;
use url::Url;

use super::{Reply, ReplyService};
use crate::error::ReplyError;

/// Request body sent to the reply endpoint.
#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    input: &'a str,
}

/// Reply service reached over HTTP.
///
/// No client-side timeout is configured: a request waits for the transport
/// to either answer or fail.
#[derive(Clone)]
pub struct HttpReplyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for HttpReplyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReplyClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpReplyClient {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Use a preconfigured `reqwest` client (proxies, custom TLS roots).
    #[must_use]
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ReplyService for HttpReplyClient {
    async fn ask(&self, input: &str) -> Result<Reply, ReplyError> {
        tracing::debug!(
            name: "reply.request.sent",
            endpoint = %self.endpoint,
            input_length = input.len(),
            "Sending input to reply service"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&ReplyRequest { input })
            .send()
            .await?;

        // The status code is informational only: the body decides.
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(
                name: "reply.response.status",
                status = %status,
                "Reply service returned a non-success status"
            );
        }

        let body = resp.bytes().await?;
        let reply = Reply::from_body(&body)?;

        tracing::debug!(
            name: "reply.response.received",
            status = %status,
            empty = matches!(reply, Reply::Empty),
            "Reply service answered"
        );
        Ok(reply)
    }
}
