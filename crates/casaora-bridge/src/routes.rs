use std::sync::Arc;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use casaora_core::ui_stream::{
    EVENT_STREAM_CONTENT_TYPE, FrameEncoder, UI_MESSAGE_STREAM_HEADER, UI_MESSAGE_STREAM_VERSION,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::resolve_credential;
use crate::bridge::{TurnTranslator, frame_stream};
use crate::error::ApiError;
use crate::request::TurnRequest;
use crate::upstream::AgentClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<AgentClient>,
    pub encoder: FrameEncoder,
    pub session_cookie: Arc<str>,
}

/// First value of `key` in a decoded query string. Repeated keys are allowed.
fn first_query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Build the bridge router.
pub fn build_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", get(health))
        .route("/api/agent/chats/{chat_id}/messages/stream", post(stream_turn))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `POST /api/agent/chats/{chat_id}/messages/stream`: run one chat turn.
///
/// Input, credential and upstream-connection failures are answered with a
/// single JSON error. Once the agent stream is open the response is the UI
/// message stream, which always ends with a finalize sequence.
pub async fn stream_turn(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let turn = TurnRequest::from_parts(&chat_id, first_query_value(&query, "org_id"), &body)?;
    let credential =
        resolve_credential(&headers, &state.session_cookie).ok_or(ApiError::Unauthorized)?;

    let upstream = state.agent.open_stream(&turn, &credential).await?;

    let message_id = uuid::Uuid::new_v4().to_string();
    info!(
        conversation_id = %turn.conversation_id,
        org_id = %turn.org_scope,
        message_id = %message_id,
        allow_mutations = ?turn.write_flags.allow_mutations,
        "Agent stream opened"
    );

    let frames = frame_stream(
        upstream.bytes_stream(),
        TurnTranslator::new(message_id),
        state.encoder.clone(),
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
        ],
        [
            ("x-accel-buffering", "no"),
            (UI_MESSAGE_STREAM_HEADER, UI_MESSAGE_STREAM_VERSION),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_query_value_takes_first_occurrence() {
        let query = pairs(&[("x", "1"), ("org_id", "a"), ("org_id", "b")]);
        assert_eq!(first_query_value(&query, "org_id"), Some("a"));
        assert_eq!(first_query_value(&query, "missing"), None);
    }
}
