//! Agent backend client.
//!
//! Opens the backend's per-turn event stream. Only connection-level and
//! status-level failures are reported here; the body is handed back as-is for
//! the frame pump to read incrementally.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Response, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::request::TurnRequest;

/// Agent backend errors.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Connect(#[from] reqwest::Error),

    #[error("Agent API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Config(String),
}

/// Body of the backend's streaming message endpoint.
#[derive(Debug, Serialize)]
struct StreamMessageBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_mutations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirm_write: Option<bool>,
}

/// Client for the agent backend's chat endpoints.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:8000/v1`).
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, UpstreamError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(UpstreamError::Config("api_base_url is empty".into()));
        }
        let base_url = Url::parse(trimmed)
            .map_err(|e| UpstreamError::Config(format!("Invalid api_base_url {trimmed}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Config(format!(
                "api_base_url {trimmed} cannot carry a path"
            )));
        }

        // reqwest is built with rustls-no-provider; `Err` means a provider is
        // already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// URL of the streaming message endpoint for one conversation.
    pub fn stream_url(&self, conversation_id: &str, org_scope: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Config("api_base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["agent", "chats", conversation_id, "messages", "stream"]);
        url.query_pairs_mut().append_pair("org_id", org_scope);
        Ok(url)
    }

    /// Start a turn on the backend and return the response whose body is the
    /// event stream.
    pub async fn open_stream(
        &self,
        turn: &TurnRequest,
        credential: &str,
    ) -> Result<Response, UpstreamError> {
        let url = self.stream_url(&turn.conversation_id, &turn.org_scope)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| UpstreamError::Config("Invalid credential format".into()))?;

        let body = StreamMessageBody {
            message: &turn.user_message,
            allow_mutations: turn.write_flags.allow_mutations,
            confirm_write: turn.write_flags.confirm_write,
        };

        debug!(url = %url, "Opening agent stream");
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, bearer)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Agent stream rejected");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: status_message(text, status.canonical_reason()),
            });
        }

        Ok(resp)
    }
}

/// Pick the most informative message for a rejected stream request.
fn status_message(body: String, reason: Option<&str>) -> String {
    if !body.is_empty() {
        return body;
    }
    reason.unwrap_or("Streaming request failed.").to_string()
}
