use std::fmt::Display;

use async_stream::try_stream;
use axum::body::Bytes;
use casaora_core::ui_stream::FrameEncoder;
use casaora_core::upstream::{LineDecoder, decode_data_line, parse_line};
use thiserror::Error;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::translator::TurnTranslator;

/// Failures after the output stream has started.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Upstream stream failed: {0}")]
    UpstreamRead(String),
}

/// Pump upstream bytes through `translator`, yielding encoded frames.
///
/// The stream is pull-based: upstream is read only while the consumer polls,
/// so dropping the returned stream releases the upstream connection. Malformed
/// lines are skipped. Reading stops once the turn is finalized; if upstream
/// ends first the turn is finalized with the text accumulated so far. A read
/// failure before that is yielded as an error, which ends the stream.
pub fn frame_stream<S, E>(
    upstream: S,
    mut translator: TurnTranslator,
    encoder: FrameEncoder,
) -> impl Stream<Item = Result<Bytes, BridgeError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    try_stream! {
        let mut upstream = Box::pin(upstream);
        let mut lines = LineDecoder::new();
        let mut frames_written = 0usize;
        let mut dropped_lines = 0usize;

        'read: while let Some(chunk) = upstream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(
                    message_id = %translator.message_id(),
                    error = %e,
                    "Upstream read failed before finalize"
                );
                BridgeError::UpstreamRead(e.to_string())
            })?;

            for line in lines.push(&chunk) {
                let Some(payload) = decode_data_line(&line) else {
                    continue;
                };
                let event = match parse_line(payload) {
                    Ok(event) => event,
                    Err(e) => {
                        dropped_lines += 1;
                        debug!(error = %e, "Dropping malformed upstream line");
                        continue;
                    }
                };

                for frame in translator.process(event) {
                    frames_written += 1;
                    yield Bytes::from(encoder.encode(&frame));
                }
                if translator.is_finished() {
                    break 'read;
                }
            }
        }

        if !translator.is_finished() {
            debug!(
                message_id = %translator.message_id(),
                pending_bytes = lines.pending_len(),
                "Upstream ended without done, finalizing"
            );
        }
        for frame in translator.finish() {
            frames_written += 1;
            yield Bytes::from(encoder.encode(&frame));
        }

        info!(
            message_id = %translator.message_id(),
            frames_written,
            dropped_lines,
            "Turn stream complete"
        );
    }
}
