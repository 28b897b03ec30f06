//! Agent backend event stream.
//!
//! The backend answers a chat turn with server-sent events whose `data:`
//! payloads are JSON objects tagged by `type`. This module splits the raw
//! byte stream into lines and parses payloads into canonical events,
//! implementing a tolerant reader pattern.

mod lines;
mod parser;
mod types;

pub use lines::{LineDecoder, decode_data_line};
pub use parser::{parse_line, parse_value};
pub use types::*;
