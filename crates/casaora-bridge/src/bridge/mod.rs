//! Upstream event stream to UI message stream translation.
//!
//! All state here is owned by a single turn: a fresh [`TurnTranslator`] is
//! built per request and dropped when the response stream ends.

mod pump;
mod state;
mod tracker;
mod translator;

pub use pump::{BridgeError, frame_stream};
pub use state::StreamState;
pub use tracker::ToolCallTracker;
pub use translator::{DEFAULT_ERROR_TEXT, DEFAULT_TOOL_NAME, TurnTranslator};
