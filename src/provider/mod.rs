//! Provider: opening a streamed chat completion over HTTP.
//!
//! The consumer does not care where bytes come from. This module produces a
//! [`Transport`](crate::stream::Transport) backed by an OpenAI-compatible
//! `/chat/completions` endpoint with `stream: true`.

mod openai;
mod request;

pub use openai::{ChatStream, OpenAiClient};
pub use request::{ChatRequest, WireMessage};
