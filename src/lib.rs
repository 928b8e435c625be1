//! # Fadestream
//!
//! Streaming chat replies for the terminal, with words that fade in.
//!
//! A reply arrives as a byte stream of `data: {json}` lines. Fadestream
//! decodes it incrementally, accumulates the content deltas, splits the
//! growing text into words, spaces and newlines, and draws every new word
//! fading in from the background.
//!
//! ## Core Concepts
//!
//! - **Incremental decoding**: bytes split anywhere (even inside a UTF-8
//!   character) decode to the same lines
//! - **Tolerant framing**: malformed frames are logged and skipped, never fatal
//! - **One reply at a time**: a conversation rejects input while streaming
//! - **Stable units**: growing text only appends units, so a visible word
//!   never fades in twice
//!
//! ## Example
//!
//! ```rust
//! use fadestream::{consume_stream, ConsumerConfig, Conversation, ScriptedTransport, Snapshot};
//! use std::ops::ControlFlow;
//!
//! let body = concat!(
//!     "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
//!     "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n",
//!     "data: [DONE]\n",
//! );
//!
//! let mut conversation = Conversation::new();
//! let turn = conversation.submit("Hello").unwrap();
//! let transport = ScriptedTransport::split_every(body.as_bytes(), 7);
//!
//! let mut sink = |_: Snapshot| ControlFlow::Continue(());
//! let outcome = consume_stream(transport, turn, &ConsumerConfig::default(), &mut sink);
//! assert_eq!(outcome.content, "Hi there");
//! conversation.seal(outcome).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod chunk;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod provider;
pub mod render;
pub mod stream;

// Re-exports for convenience
pub use actor::{consume_stream, FrameTicker, Snapshot, SnapshotSink, StreamConsumer, Tick};
pub use chunk::{chunk, Chunker, RenderUnit, UnitKind};
pub use config::{ConsumerConfig, NoticePolicy, ProviderConfig};
pub use conversation::{Conversation, EndReason, Message, MessageId, Role, StreamStatus, Turn, TurnOutcome};
pub use error::{ConfigError, ConversationError, TransportError};
pub use provider::{ChatStream, OpenAiClient};
pub use render::{ChatView, FadeClock, FadeConfig, OutputBuffer, Rgb, Style};
pub use stream::{parse_line, Frame, LineDecoder, ReadTransport, ScriptedTransport, Transport};
