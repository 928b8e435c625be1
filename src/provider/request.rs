//! Request body for a streamed chat completion.

use crate::conversation::{Message, Role};
use serde::Serialize;

/// One message in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    /// Author role.
    pub role: Role,
    /// Text.
    pub content: String,
}

/// Body of a streamed chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Model name.
    pub model: String,
    /// Always `true`.
    pub stream: bool,
    /// Conversation so far, oldest first.
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// Build a request from conversation history.
    ///
    /// Replies that failed or never received content are left out; they
    /// hold a local notice, not something the model said.
    pub fn new(model: impl Into<String>, history: &[Message]) -> Self {
        let messages = history
            .iter()
            .filter(|m| match m.role {
                Role::User => true,
                Role::Assistant => !m.status.is_failed() && !m.content.is_empty(),
            })
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        Self {
            model: model.into(),
            stream: true,
            messages,
        }
    }
}
