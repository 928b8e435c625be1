//! Error types.
//!
//! Only failures that the caller has to act on are errors. A malformed frame
//! is not one of them (see [`crate::stream::parse_line`]), and the way a turn
//! ends is reported as [`crate::conversation::StreamStatus`] rather than as an error.

use thiserror::Error;

/// Failure of the byte transport underneath a stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading the body failed or the connection dropped.
    #[error("transport read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The transport was used after it reported end of stream or an error.
    #[error("transport already closed")]
    Closed,
}

/// Rejected conversation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// A reply is still streaming.
    #[error("a reply is still streaming")]
    Busy,

    /// Submitted text was empty after trimming.
    #[error("cannot submit an empty message")]
    EmptyInput,

    /// No active turn has this message id.
    #[error("no active turn for message {id}")]
    UnknownTurn {
        /// The assistant message id that was given.
        id: u64,
    },
}

/// Invalid or missing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No API key in the config or environment.
    #[error("missing API key (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// A field holds an unusable value.
    #[error("invalid config value for '{field}': {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
