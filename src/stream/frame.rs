//! Frame parser: interprets `data: <payload>` event lines.
//!
//! The provider streams one event per line:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```
//!
//! Every complete line maps to exactly one [`Frame`]. Nothing in here fails:
//! a malformed payload is logged and treated as noise so that one bad frame
//! cannot abort the stream.

use serde::Deserialize;
use tracing::{trace, warn};

/// The event field prefix that carries a payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Quoted form of the sentinel, also accepted.
const QUOTED_DONE_SENTINEL: &str = "\"[DONE]\"";

/// Longest payload excerpt included in a log record.
const LOG_EXCERPT_CHARS: usize = 120;

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-empty fragment of reply content.
    ContentDelta(String),
    /// Normal end of stream.
    Done,
    /// Blank, non-data, empty or malformed line.
    Ignorable,
}

impl Frame {
    /// Get the delta text, if this is a content frame.
    pub fn delta(&self) -> Option<&str> {
        match self {
            Self::ContentDelta(text) => Some(text),
            _ => None,
        }
    }

    /// Check if this is the terminal sentinel.
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Streaming chat-completion chunk. Only the fields read here are modelled.
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Parse one complete line into a frame.
///
/// # Example
///
/// ```
/// use fadestream::stream::{parse_line, Frame};
///
/// assert_eq!(parse_line("data: [DONE]"), Frame::Done);
/// assert_eq!(parse_line("event: ping"), Frame::Ignorable);
/// ```
pub fn parse_line(line: &str) -> Frame {
    let line = line.trim();
    if line.is_empty() {
        return Frame::Ignorable;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        trace!(line, "ignoring non-data line");
        return Frame::Ignorable;
    };
    let payload = payload.trim();

    if payload == DONE_SENTINEL || payload == QUOTED_DONE_SENTINEL {
        return Frame::Done;
    }

    match serde_json::from_str::<CompletionChunk>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
            .map_or(Frame::Ignorable, Frame::ContentDelta),
        Err(e) => {
            warn!(error = %e, payload = %excerpt(payload), "skipping malformed frame");
            Frame::Ignorable
        }
    }
}

/// Truncate a payload for logging.
fn excerpt(payload: &str) -> &str {
    match payload.char_indices().nth(LOG_EXCERPT_CHARS) {
        Some((end, _)) => &payload[..end],
        None => payload,
    }
}
