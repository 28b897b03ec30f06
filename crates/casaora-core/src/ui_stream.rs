//! UI message stream protocol.
//!
//! Frames consumed incrementally by the chat renderer. Each frame travels as
//! one server-sent event, `data: <json>\n\n`; the stream ends with the literal
//! `data: [DONE]\n\n` marker. Application-specific frames use the
//! `data-<namespace>-<kind>` type convention.

use serde_json::{Value, json};

/// Response header announcing the stream protocol version.
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";

/// Protocol version sent in [`UI_MESSAGE_STREAM_HEADER`].
pub const UI_MESSAGE_STREAM_VERSION: &str = "v1";

/// Content type of the framed stream.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=utf-8";

/// One frame of the UI message stream.
#[derive(Debug, Clone, PartialEq)]
pub enum UiFrame {
    Start {
        message_id: String,
    },
    Status {
        message: String,
    },
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    /// Mirror of [`UiFrame::ToolInputAvailable`] on the namespaced data channel.
    ToolCallEvent {
        tool_call_id: String,
        tool_name: String,
        args: Value,
    },
    ToolOutputAvailable {
        tool_call_id: String,
        ok: bool,
        preview: String,
    },
    /// Mirror of [`UiFrame::ToolOutputAvailable`] on the namespaced data channel.
    ToolResultEvent {
        tool_call_id: String,
        tool_name: String,
        ok: bool,
        preview: String,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    Meta {
        message_id: String,
        model_used: Option<String>,
        fallback_used: bool,
        tool_trace: Vec<Value>,
    },
    FinishStep,
    Finish,
    Error {
        error_text: String,
    },
    /// Terminal `[DONE]` marker.
    Done,
}

impl UiFrame {
    /// Short name used in logs and assertions.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Status { .. } => "status",
            Self::ToolInputAvailable { .. } => "tool-input-available",
            Self::ToolCallEvent { .. } => "tool-call",
            Self::ToolOutputAvailable { .. } => "tool-output-available",
            Self::ToolResultEvent { .. } => "tool-result",
            Self::TextStart { .. } => "text-start",
            Self::TextDelta { .. } => "text-delta",
            Self::TextEnd { .. } => "text-end",
            Self::Meta { .. } => "meta",
            Self::FinishStep => "finish-step",
            Self::Finish => "finish",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }
}

/// Renders frames in wire format for one namespace.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    namespace: String,
}

impl FrameEncoder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The JSON payload of a frame. `None` for the `[DONE]` marker.
    pub fn to_json(&self, frame: &UiFrame) -> Option<Value> {
        let ns = &self.namespace;
        let value = match frame {
            UiFrame::Start { message_id } => json!({
                "type": "start",
                "messageId": message_id,
            }),
            UiFrame::Status { message } => json!({
                "type": format!("data-{ns}-status"),
                "data": { "message": message },
            }),
            UiFrame::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            } => json!({
                "type": "tool-input-available",
                "toolCallId": tool_call_id,
                "toolName": tool_name,
                "input": input,
            }),
            UiFrame::ToolCallEvent {
                tool_call_id,
                tool_name,
                args,
            } => json!({
                "type": format!("data-{ns}-tool"),
                "data": {
                    "phase": "call",
                    "tool_name": tool_name,
                    "tool_call_id": tool_call_id,
                    "args": args,
                },
            }),
            UiFrame::ToolOutputAvailable {
                tool_call_id,
                ok,
                preview,
            } => json!({
                "type": "tool-output-available",
                "toolCallId": tool_call_id,
                "output": { "ok": ok, "preview": preview },
            }),
            UiFrame::ToolResultEvent {
                tool_call_id,
                tool_name,
                ok,
                preview,
            } => json!({
                "type": format!("data-{ns}-tool"),
                "data": {
                    "phase": "result",
                    "tool_name": tool_name,
                    "tool_call_id": tool_call_id,
                    "ok": ok,
                    "preview": preview,
                },
            }),
            UiFrame::TextStart { id } => json!({ "type": "text-start", "id": id }),
            UiFrame::TextDelta { id, delta } => json!({
                "type": "text-delta",
                "id": id,
                "delta": delta,
            }),
            UiFrame::TextEnd { id } => json!({ "type": "text-end", "id": id }),
            UiFrame::Meta {
                message_id,
                model_used,
                fallback_used,
                tool_trace,
            } => json!({
                "type": format!("data-{ns}-meta"),
                "data": {
                    "messageId": message_id,
                    "model_used": model_used,
                    "fallback_used": fallback_used,
                    "tool_trace": tool_trace,
                },
            }),
            UiFrame::FinishStep => json!({ "type": "finish-step" }),
            UiFrame::Finish => json!({ "type": "finish" }),
            UiFrame::Error { error_text } => json!({
                "type": "error",
                "errorText": error_text,
            }),
            UiFrame::Done => return None,
        };
        Some(value)
    }

    /// Encode a frame as one server-sent event.
    pub fn encode(&self, frame: &UiFrame) -> String {
        match self.to_json(frame) {
            Some(value) => format!("data: {value}\n\n"),
            None => "data: [DONE]\n\n".to_string(),
        }
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new("casaora")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(wire: &str) -> Value {
        let payload = wire
            .strip_prefix("data: ")
            .and_then(|s| s.strip_suffix("\n\n"))
            .unwrap();
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn start_frame_wire_format() {
        let wire = FrameEncoder::default().encode(&UiFrame::Start {
            message_id: "m1".into(),
        });
        assert_eq!(decode(&wire), json!({"type":"start","messageId":"m1"}));
    }

    #[test]
    fn done_marker_is_literal() {
        assert_eq!(FrameEncoder::default().encode(&UiFrame::Done), "data: [DONE]\n\n");
    }

    #[test]
    fn data_frames_use_namespace() {
        let encoder = FrameEncoder::new("acme");
        let status = encoder
            .to_json(&UiFrame::Status {
                message: "Thinking".into(),
            })
            .unwrap();
        assert_eq!(status, json!({"type":"data-acme-status","data":{"message":"Thinking"}}));

        let tool = encoder
            .to_json(&UiFrame::ToolResultEvent {
                tool_call_id: "tool-call-1".into(),
                tool_name: "search".into(),
                ok: true,
                preview: "3 hits".into(),
            })
            .unwrap();
        assert_eq!(tool["type"], "data-acme-tool");
        assert_eq!(tool["data"]["phase"], "result");
        assert_eq!(tool["data"]["tool_call_id"], "tool-call-1");
    }

    #[test]
    fn meta_frame_serializes_missing_model_as_null() {
        let meta = FrameEncoder::default()
            .to_json(&UiFrame::Meta {
                message_id: "m1".into(),
                model_used: None,
                fallback_used: false,
                tool_trace: Vec::new(),
            })
            .unwrap();
        assert_eq!(
            meta,
            json!({
                "type": "data-casaora-meta",
                "data": {"messageId":"m1","model_used":null,"fallback_used":false,"tool_trace":[]}
            })
        );
    }

    #[test]
    fn tool_output_nests_ok_and_preview() {
        let frame = FrameEncoder::default()
            .to_json(&UiFrame::ToolOutputAvailable {
                tool_call_id: "tool-call-2".into(),
                ok: false,
                preview: String::new(),
            })
            .unwrap();
        assert_eq!(
            frame,
            json!({
                "type": "tool-output-available",
                "toolCallId": "tool-call-2",
                "output": {"ok": false, "preview": ""}
            })
        );
    }
}
