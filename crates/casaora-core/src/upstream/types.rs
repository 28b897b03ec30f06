//! Event types emitted by the agent backend.

use serde_json::Value;

/// Canonical events from the agent backend's stream.
///
/// Optional fields are `None` when the backend omitted them or sent a value of
/// the wrong JSON type; defaults are applied by the translator, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEvent {
    /// Progress note while the agent works.
    Status { message: Option<String> },
    /// The agent invoked a tool.
    ToolCall {
        name: Option<String>,
        args: Option<Value>,
    },
    /// A tool finished. Correlated to its call by name only.
    ToolResult {
        name: Option<String>,
        ok: bool,
        preview: Option<String>,
    },
    /// Assistant text so far. Usually the full accumulated text, not a delta.
    Token { text: Option<String> },
    /// Turn completed.
    Done(TurnSummary),
    /// The backend failed mid-turn.
    Error { message: Option<String> },
    /// Anything else, including payloads without a `type`.
    Unknown { event_type: String },
}

/// Final content and metadata carried by a `done` event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TurnSummary {
    pub content: String,
    pub model_used: Option<String>,
    pub fallback_used: bool,
    pub tool_trace: Vec<Value>,
}
