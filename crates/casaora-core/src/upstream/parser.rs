//! Parser for agent backend event payloads.
//!
//! Implements tolerant reader pattern: unknown fields ignored, unknown types
//! mapped to [`UpstreamEvent::Unknown`], mistyped fields treated as absent.

use serde_json::Value;

use super::types::{TurnSummary, UpstreamEvent};
use crate::error::Result;

/// Parse the JSON payload of a single `data:` line.
///
/// Only invalid JSON is an error; any well-formed value maps to an event.
pub fn parse_line(payload: &str) -> Result<UpstreamEvent> {
    let raw: Value = serde_json::from_str(payload)?;
    Ok(parse_value(&raw))
}

/// Parse a JSON value into a canonical event.
pub fn parse_value(raw: &Value) -> UpstreamEvent {
    let event_type = raw.get("type").and_then(Value::as_str).unwrap_or("");

    match event_type {
        "status" => UpstreamEvent::Status {
            message: string_field(raw, "message"),
        },
        "tool_call" => UpstreamEvent::ToolCall {
            name: string_field(raw, "name"),
            args: raw
                .get("args")
                .filter(|v| v.is_object() || v.is_array())
                .cloned(),
        },
        "tool_result" => UpstreamEvent::ToolResult {
            name: string_field(raw, "name"),
            ok: strict_true(raw, "ok"),
            preview: string_field(raw, "preview"),
        },
        "token" => UpstreamEvent::Token {
            text: string_field(raw, "text"),
        },
        "done" => UpstreamEvent::Done(TurnSummary {
            content: string_field(raw, "content").unwrap_or_default(),
            model_used: string_field(raw, "model_used"),
            fallback_used: strict_true(raw, "fallback_used"),
            tool_trace: raw
                .get("tool_trace")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }),
        "error" => UpstreamEvent::Error {
            message: string_field(raw, "message"),
        },
        other => UpstreamEvent::Unknown {
            event_type: other.to_string(),
        },
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(String::from)
}

fn strict_true(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool) == Some(true)
}
