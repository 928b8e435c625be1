//! Transport: the byte source a stream is read from.
//!
//! The consumer only needs "give me the next chunk, or tell me the stream is
//! over". Anything implementing [`std::io::Read`] can be wrapped with
//! [`ReadTransport`]; [`ScriptedTransport`] replays a fixed sequence of
//! chunks and failures.

use crate::error::TransportError;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

/// Default read size for reader-backed transports.
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// A source of raw byte chunks, delivered in send order.
pub trait Transport {
    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the stream has ended. Chunk boundaries carry no
    /// meaning.
    ///
    /// After `Ok(None)` every further call returns `Ok(None)` again. After an
    /// error every further call returns [`TransportError::Closed`].
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).next_chunk()
    }
}

/// Where a transport is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Open,
    Ended,
    Failed,
}

impl State {
    /// The answer owed to a read after the stream is over.
    fn settled(self) -> Option<Result<Option<Vec<u8>>, TransportError>> {
        match self {
            Self::Open => None,
            Self::Ended => Some(Ok(None)),
            Self::Failed => Some(Err(TransportError::Closed)),
        }
    }
}

/// Transport over any blocking reader (an HTTP body, a file, a pipe).
#[derive(Debug)]
pub struct ReadTransport<R> {
    reader: R,
    chunk_size: usize,
    state: State,
}

impl<R: Read> ReadTransport<R> {
    /// Wrap a reader with the default chunk size.
    pub const fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_READ_CHUNK)
    }

    /// Wrap a reader, reading at most `chunk_size` bytes per call.
    pub const fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: if chunk_size == 0 { DEFAULT_READ_CHUNK } else { chunk_size },
            state: State::Open,
        }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Transport for ReadTransport<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(settled) = self.state.settled() {
            return settled;
        }

        let mut buf = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.state = State::Ended;
                    return Ok(None);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.state = State::Failed;
                    return Err(TransportError::Io(e));
                }
            }
        }
    }
}

/// One scripted step.
#[derive(Debug)]
enum Step {
    Chunk(Vec<u8>),
    Fail(TransportError),
}

/// In-memory transport that replays chunks, optionally ending in a failure.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: VecDeque<Step>,
    state: State,
}

impl ScriptedTransport {
    /// Create an empty script (ends immediately).
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the given chunks.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let mut script = Self::new();
        for chunk in chunks {
            script = script.chunk(chunk);
        }
        script
    }

    /// Script `bytes` split into pieces of `size` bytes.
    ///
    /// Splits ignore character and line boundaries.
    pub fn split_every(bytes: &[u8], size: usize) -> Self {
        Self::from_chunks(bytes.chunks(size.max(1)).map(<[u8]>::to_vec))
    }

    /// Append a chunk.
    #[must_use]
    pub fn chunk(mut self, chunk: impl Into<Vec<u8>>) -> Self {
        self.steps.push_back(Step::Chunk(chunk.into()));
        self
    }

    /// Append a read failure.
    #[must_use]
    pub fn fail(mut self, error: TransportError) -> Self {
        self.steps.push_back(Step::Fail(error));
        self
    }

    /// Number of steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl Transport for ScriptedTransport {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(settled) = self.state.settled() {
            return settled;
        }
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => Ok(Some(bytes)),
            Some(Step::Fail(error)) => {
                self.state = State::Failed;
                Err(error)
            }
            None => {
                self.state = State::Ended;
                Ok(None)
            }
        }
    }
}
