//! Conversation and turn lifecycle.
//!
//! A [`Turn`] is the request object for one reply. It is created by
//! [`Conversation::submit`], which also raises the busy flag, travels through
//! the stream consumer, and is finally turned into a [`TurnOutcome`] that
//! [`Conversation::seal`] applies. Only one turn exists per conversation at a
//! time.
//!
//! ```text
//!            submit()                     complete()
//!   Idle ─────────────▶ Active(content) ─────────────▶ Completed(content)
//!     ▲                        │           fail()
//!     │                        └─────────────────────▶ Failed(notice)
//!     └──────────────── seal() ◀─────────────────────────────┘
//! ```

use super::accumulator::{Accumulator, ContentReader};
use super::message::{EndReason, Message, MessageId, StreamStatus};
use crate::config::NoticePolicy;
use crate::error::ConversationError;
use tracing::{debug, warn};

/// The in-flight reply: owns the accumulator for one assistant message.
#[derive(Debug)]
pub struct Turn {
    message_id: MessageId,
    history: Vec<Message>,
    accumulator: Accumulator,
}

impl Turn {
    /// Id of the assistant message this turn fills.
    pub const fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// Messages to send to the provider (everything up to the user message).
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a delta, returning the full content.
    pub fn append(&mut self, delta: &str) -> String {
        self.accumulator.append(delta)
    }

    /// Current content.
    pub fn content(&self) -> String {
        self.accumulator.snapshot()
    }

    /// Check if any delta arrived.
    pub const fn has_content(&self) -> bool {
        self.accumulator.has_content()
    }

    /// Read handle for other threads.
    pub fn reader(&self) -> ContentReader {
        self.accumulator.reader()
    }

    /// End normally, keeping the accumulated content.
    pub fn complete(self, reason: EndReason) -> TurnOutcome {
        TurnOutcome {
            message_id: self.message_id,
            content: self.accumulator.into_content(),
            status: StreamStatus::Completed(reason),
        }
    }

    /// End in a transport failure.
    ///
    /// Depending on `policy` the content is replaced with `notice`.
    pub fn fail(self, error: impl Into<String>, notice: &str, policy: NoticePolicy) -> TurnOutcome {
        let replace = match policy {
            NoticePolicy::Always => true,
            NoticePolicy::WhenEmpty => !self.accumulator.has_content(),
        };
        let content = if replace {
            notice.to_string()
        } else {
            self.accumulator.into_content()
        };
        TurnOutcome {
            message_id: self.message_id,
            content,
            status: StreamStatus::Failed(error.into()),
        }
    }
}

/// Terminal result of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The assistant message the turn filled.
    pub message_id: MessageId,
    /// Final content.
    pub content: String,
    /// Terminal status (never `Active`).
    pub status: StreamStatus,
}

/// An ordered chat history with at most one streaming reply.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    active: Option<MessageId>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Check if a reply is streaming.
    pub const fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The streaming assistant message, if any.
    pub fn active_message(&self) -> Option<&Message> {
        let id = self.active?;
        self.find(id)
    }

    /// Submit user text and start a new turn.
    ///
    /// Fails with [`ConversationError::Busy`] while a reply is streaming.
    pub fn submit(&mut self, text: &str) -> Result<Turn, ConversationError> {
        if let Some(active) = self.active {
            warn!(active = %active, "rejecting submit while a reply is streaming");
            return Err(ConversationError::Busy);
        }
        if text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let user_id = self.allocate_id();
        self.messages.push(Message::user(user_id, text));
        let history = self.messages.clone();

        let reply_id = self.allocate_id();
        self.messages.push(Message::pending_assistant(reply_id));
        self.active = Some(reply_id);

        debug!(user = %user_id, reply = %reply_id, "turn started");
        Ok(Turn {
            message_id: reply_id,
            history,
            accumulator: Accumulator::new(),
        })
    }

    /// Mirror live content into the streaming message.
    ///
    /// Returns `false` if `id` is not the active message.
    pub fn apply(&mut self, id: MessageId, content: &str) -> bool {
        if self.active != Some(id) {
            return false;
        }
        match self.find_mut(id) {
            Some(message) => {
                content.clone_into(&mut message.content);
                true
            }
            None => false,
        }
    }

    /// Apply a turn's outcome: the message becomes immutable and the busy
    /// flag is cleared.
    pub fn seal(&mut self, outcome: TurnOutcome) -> Result<(), ConversationError> {
        if self.active != Some(outcome.message_id) {
            return Err(ConversationError::UnknownTurn {
                id: outcome.message_id.0,
            });
        }
        let message = self
            .find_mut(outcome.message_id)
            .ok_or(ConversationError::UnknownTurn {
                id: outcome.message_id.0,
            })?;

        debug!(reply = %outcome.message_id, status = ?outcome.status, "turn sealed");
        message.content = outcome.content;
        message.status = outcome.status;
        self.active = None;
        Ok(())
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }

    fn find(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.id == id)
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }
}
