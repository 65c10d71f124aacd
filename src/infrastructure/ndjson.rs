//! Newline-delimited JSON framing for the backend's streaming responses.
//!
//! Framing works on raw bytes, so a line (or a multi-byte character) split across transport
//! chunks decodes the same as one delivered whole.

use crate::core::error::BackendError;
use crate::infrastructure::entities::BackendEvent;
use crate::infrastructure::http::within;
use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use std::time::Duration;

/// Splits a byte stream into non-blank lines.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
}

impl LineDecoder {
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete, non-blank line, without its terminator.
    pub fn next_line(&mut self) -> Option<Bytes> {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos + 1).freeze();
            if let Some(line) = non_blank(line) {
                return Some(line);
            }
        }
        None
    }

    /// Whatever is left once the body has ended. A final line needs no terminator.
    pub fn finish(&mut self) -> Option<Bytes> {
        let rest = self.buffer.split().freeze();
        non_blank(rest)
    }
}

fn non_blank(line: Bytes) -> Option<Bytes> {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    let line = line.slice(..end);
    if line.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(line)
    }
}

/// Decodes a chunked body into backend events.
///
/// The stream ends after the first `Err`: a transport failure, a malformed line, or no chunk
/// arriving within `idle_timeout`.
pub fn decode_events<S, E>(
    chunks: S,
    idle_timeout: Option<Duration>,
) -> impl Stream<Item = Result<BackendEvent, BackendError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    stream! {
        let mut chunks = Box::pin(chunks);
        let mut decoder = LineDecoder::default();

        loop {
            let next = match within(idle_timeout, chunks.next()).await {
                Ok(next) => next,
                Err(limit) => {
                    yield Err(BackendError::Idle(limit));
                    return;
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    decoder.push(&chunk);
                    while let Some(line) = decoder.next_line() {
                        match serde_json::from_slice::<BackendEvent>(&line) {
                            Ok(event) => {
                                yield Ok(event);
                            }
                            Err(e) => {
                                yield Err(BackendError::Malformed(e));
                                return;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    yield Err(BackendError::Transport(Box::new(e)));
                    return;
                }
                None => {
                    if let Some(line) = decoder.finish() {
                        yield serde_json::from_slice::<BackendEvent>(&line).map_err(BackendError::from);
                    }
                    return;
                }
            }
        }
    }
}
