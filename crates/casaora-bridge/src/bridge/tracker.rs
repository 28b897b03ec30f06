use std::collections::{HashMap, VecDeque};

use tracing::debug;

/// Correlates tool results to tool calls within one turn.
///
/// The backend identifies tools by name only, so ids are generated locally
/// and matched first-in first-out per tool name.
#[derive(Debug, Default)]
pub struct ToolCallTracker {
    counter: u64,
    pending: HashMap<String, VecDeque<String>>,
}

impl ToolCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new call and queue it under `tool_name`.
    pub fn open_call(&mut self, tool_name: &str) -> String {
        self.counter += 1;
        let id = format!("tool-call-{}", self.counter);
        self.pending
            .entry(tool_name.to_string())
            .or_default()
            .push_back(id.clone());
        id
    }

    /// Take the oldest open call for `tool_name`.
    ///
    /// A result with no open call gets the id the next call would receive;
    /// the counter is not advanced.
    pub fn close_call(&mut self, tool_name: &str) -> String {
        if let Some(id) = self.pending.get_mut(tool_name).and_then(VecDeque::pop_front) {
            return id;
        }
        debug!(tool_name, "Tool result without an open call");
        format!("tool-call-{}", self.counter + 1)
    }

    /// Number of calls still waiting for a result.
    pub fn open_calls(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }
}
