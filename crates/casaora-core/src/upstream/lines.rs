//! Incremental line splitting for the backend's event stream.

/// Prefix marking an SSE data line.
const DATA_PREFIX: &str = "data: ";

/// Terminal marker some backends append after the last event.
const DONE_MARKER: &str = "[DONE]";

/// Splits an incrementally delivered byte stream into complete lines.
///
/// Bytes are buffered until a `\n` arrives, so a multi-byte UTF-8 character
/// split across network chunks is decoded whole. A trailing fragment without
/// a terminator is never returned.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in order.
    ///
    /// Returned lines exclude the `\n`; a preceding `\r` is left for the
    /// caller's trim.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Bytes received after the last line terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Extract the payload of an SSE `data:` line.
///
/// Returns `None` for other SSE fields, blank payloads and the `[DONE]`
/// marker.
pub fn decode_data_line(line: &str) -> Option<&str> {
    let raw = line.strip_prefix(DATA_PREFIX)?.trim();
    if raw.is_empty() || raw == DONE_MARKER {
        return None;
    }
    Some(raw)
}
