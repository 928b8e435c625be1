//! Conversation state: messages, the in-flight reply and its lifecycle.
//!
//! This module contains:
//! - [`Message`], [`Role`], [`StreamStatus`]: the chat history
//! - [`Accumulator`]: the append-only content of the reply being streamed
//! - [`Conversation`] and [`Turn`]: the busy flag and the turn lifecycle

mod accumulator;
mod message;
mod session;

pub use accumulator::{Accumulator, ContentReader};
pub use message::{EndReason, Message, MessageId, Role, StreamStatus};
pub use session::{Conversation, Turn, TurnOutcome};
