use casaora_core::ui_stream::UiFrame;
use casaora_core::upstream::{TurnSummary, UpstreamEvent};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::state::StreamState;
use super::tracker::ToolCallTracker;

/// Tool name used when the backend omits one.
pub const DEFAULT_TOOL_NAME: &str = "tool";

/// Error text used when an `error` event carries no message.
pub const DEFAULT_ERROR_TEXT: &str = "Agent streaming error.";

/// Translates one turn's upstream events into UI frames.
///
/// `start` and `text-start` are written lazily and at most once; the finalize
/// sequence (`text-end`, meta, `finish-step`, `finish`, `[DONE]`) is written
/// exactly once, after which every call returns no frames.
#[derive(Debug)]
pub struct TurnTranslator {
    message_id: String,
    text_part_id: String,
    state: StreamState,
    current_text: String,
    tools: ToolCallTracker,
}

impl TurnTranslator {
    pub fn new(message_id: impl Into<String>) -> Self {
        let message_id = message_id.into();
        Self {
            text_part_id: format!("text-{message_id}"),
            message_id,
            state: StreamState::default(),
            current_text: String::new(),
            tools: ToolCallTracker::new(),
        }
    }

    /// Translate one upstream event.
    ///
    /// Returns a vector because one event can produce several frames.
    pub fn process(&mut self, event: UpstreamEvent) -> Vec<UiFrame> {
        let mut out = Vec::new();
        if self.state.is_finished() {
            return out;
        }

        match event {
            UpstreamEvent::Status { message } => {
                self.ensure_started(&mut out);
                out.push(UiFrame::Status {
                    message: message.unwrap_or_default(),
                });
            }
            UpstreamEvent::ToolCall { name, args } => self.handle_tool_call(name, args, &mut out),
            UpstreamEvent::ToolResult { name, ok, preview } => {
                self.handle_tool_result(name, ok, preview, &mut out);
            }
            UpstreamEvent::Token { text: Some(text) } => {
                self.ensure_text_open(&mut out);
                self.apply_text(&text, &mut out);
            }
            UpstreamEvent::Token { text: None } => {
                debug!("Token event without text");
            }
            UpstreamEvent::Done(summary) => self.finalize(summary, &mut out),
            UpstreamEvent::Error { message } => {
                let error_text = message.unwrap_or_else(|| DEFAULT_ERROR_TEXT.to_string());
                warn!(
                    message_id = %self.message_id,
                    error = %error_text,
                    "Agent reported an error"
                );
                self.ensure_started(&mut out);
                out.push(UiFrame::Error { error_text });
                self.finalize(TurnSummary::default(), &mut out);
            }
            UpstreamEvent::Unknown { event_type } => {
                debug!(event_type, "Ignoring unknown upstream event");
            }
        }

        out
    }

    /// Finalize with the text accumulated so far. Used when the upstream
    /// stream ends without `done` or `error`.
    pub fn finish(&mut self) -> Vec<UiFrame> {
        let mut out = Vec::new();
        let summary = TurnSummary {
            content: self.current_text.clone(),
            ..TurnSummary::default()
        };
        self.finalize(summary, &mut out);
        out
    }

    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub const fn state(&self) -> StreamState {
        self.state
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Assistant text reflected in the deltas written so far.
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    fn ensure_started(&mut self, out: &mut Vec<UiFrame>) {
        if self.state.begin() {
            out.push(UiFrame::Start {
                message_id: self.message_id.clone(),
            });
        }
    }

    fn ensure_text_open(&mut self, out: &mut Vec<UiFrame>) {
        self.ensure_started(out);
        if self.state.open_text() {
            out.push(UiFrame::TextStart {
                id: self.text_part_id.clone(),
            });
        }
    }

    fn handle_tool_call(
        &mut self,
        name: Option<String>,
        args: Option<Value>,
        out: &mut Vec<UiFrame>,
    ) {
        self.ensure_started(out);
        let tool_name = tool_name(name);
        let tool_call_id = self.tools.open_call(&tool_name);
        let input = args.unwrap_or_else(|| Value::Object(Map::new()));

        out.push(UiFrame::ToolInputAvailable {
            tool_call_id: tool_call_id.clone(),
            tool_name: tool_name.clone(),
            input: input.clone(),
        });
        out.push(UiFrame::ToolCallEvent {
            tool_call_id,
            tool_name,
            args: input,
        });
    }

    fn handle_tool_result(
        &mut self,
        name: Option<String>,
        ok: bool,
        preview: Option<String>,
        out: &mut Vec<UiFrame>,
    ) {
        self.ensure_started(out);
        let tool_name = tool_name(name);
        let tool_call_id = self.tools.close_call(&tool_name);
        let preview = preview.unwrap_or_default();

        out.push(UiFrame::ToolOutputAvailable {
            tool_call_id: tool_call_id.clone(),
            ok,
            preview: preview.clone(),
        });
        out.push(UiFrame::ToolResultEvent {
            tool_call_id,
            tool_name,
            ok,
            preview,
        });
    }

    /// Reconcile `text` with what was already written.
    ///
    /// The backend usually reports the full text so far; then only the new
    /// suffix is written. Text that does not extend the current text is
    /// written whole and appended.
    fn apply_text(&mut self, text: &str, out: &mut Vec<UiFrame>) {
        if let Some(delta) = text.strip_prefix(self.current_text.as_str()) {
            if !delta.is_empty() {
                out.push(UiFrame::TextDelta {
                    id: self.text_part_id.clone(),
                    delta: delta.to_string(),
                });
            }
            self.current_text = text.to_string();
            return;
        }

        debug!(
            message_id = %self.message_id,
            "Upstream text does not extend current text, appending"
        );
        out.push(UiFrame::TextDelta {
            id: self.text_part_id.clone(),
            delta: text.to_string(),
        });
        self.current_text.push_str(text);
    }

    fn finalize(&mut self, summary: TurnSummary, out: &mut Vec<UiFrame>) {
        if self.state.is_finished() {
            return;
        }

        self.ensure_text_open(out);
        if !summary.content.is_empty() {
            self.apply_text(&summary.content, out);
        }

        out.push(UiFrame::TextEnd {
            id: self.text_part_id.clone(),
        });
        out.push(UiFrame::Meta {
            message_id: self.message_id.clone(),
            model_used: summary.model_used,
            fallback_used: summary.fallback_used,
            tool_trace: summary.tool_trace,
        });
        out.push(UiFrame::FinishStep);
        out.push(UiFrame::Finish);
        out.push(UiFrame::Done);

        if self.tools.open_calls() > 0 {
            debug!(
                message_id = %self.message_id,
                open_calls = self.tools.open_calls(),
                "Turn finished with unanswered tool calls"
            );
        }
        self.state.finish();
    }
}

fn tool_name(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string())
}
