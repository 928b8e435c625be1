//! Messages and the status of a streamed reply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,
    /// The model.
    Assistant,
}

/// Unique, monotonically assigned message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a stream stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The `[DONE]` sentinel was received.
    Done,
    /// The transport ended before the sentinel.
    TransportEnded,
    /// The consumer stopped reading.
    Cancelled,
}

/// Lifecycle of a message's content.
///
/// `Active` is the only state in which content may change. Both other states
/// are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// Deltas are still being appended.
    Active,
    /// Content is final.
    Completed(EndReason),
    /// The transport failed; content was replaced with a notice.
    Failed(String),
}

impl StreamStatus {
    /// Check if the stream is still running.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if the stream ended in a transport failure.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique id.
    pub id: MessageId,
    /// Author.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Content lifecycle. User messages are created completed.
    pub status: StreamStatus,
}

impl Message {
    /// A finished user message.
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            status: StreamStatus::Completed(EndReason::Done),
        }
    }

    /// An empty assistant message waiting for deltas.
    pub const fn pending_assistant(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: String::new(),
            status: StreamStatus::Active,
        }
    }

    /// Check if the content can still change.
    pub const fn is_streaming(&self) -> bool {
        self.status.is_active()
    }
}
