use crate::api::client::ByteStream;
use crate::api::models::StreamEvent;
use crate::error::Result;
use futures::StreamExt;
use std::collections::VecDeque;
use tracing::debug;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental splitter for the newline-delimited `data:` framing.
///
/// Bytes are buffered until a newline arrives, so frames (and multi-byte
/// characters) split across reads are decoded only once complete.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the events completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(event) = decode_line(&self.buffer[start..end]) {
                events.push(event);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        events
    }

    /// Bytes of an unterminated trailing line still held back.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

/// Decode a single complete line; padding, comments, the `[DONE]` sentinel
/// and malformed payloads all yield `None`.
pub fn decode_line(line: &[u8]) -> Option<StreamEvent> {
    let text = String::from_utf8_lossy(line);
    let text = text.strip_suffix('\r').unwrap_or(&*text);
    let payload = text.strip_prefix(DATA_PREFIX)?.trim();

    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "skipping malformed stream line");
            None
        }
    }
}

/// Pull-based sequence of events read lazily from a response body.
///
/// `next_event` only suspends on the body itself, so dropping the future
/// between pulls (cancellation) loses no decoded events.
pub struct EventStream {
    body: ByteStream,
    decoder: EventDecoder,
    pending: VecDeque<StreamEvent>,
    exhausted: bool,
}

impl EventStream {
    pub fn new(body: ByteStream) -> Self {
        Self {
            body,
            decoder: EventDecoder::new(),
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    pub async fn next_event(&mut self) -> Option<Result<StreamEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.exhausted {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    let events = self.decoder.push(&chunk);
                    self.pending.extend(events);
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
                None => {
                    self.exhausted = true;
                    if self.decoder.pending_bytes() > 0 {
                        debug!(
                            bytes = self.decoder.pending_bytes(),
                            "discarding unterminated trailing line"
                        );
                    }
                }
            }
        }
    }
}
