//! Stream Consumer: the read loop that turns a transport into live snapshots.
//!
//! [`consume_stream`] is the synchronous pipeline. It reads chunks, decodes
//! lines, parses frames, appends deltas to the [`Turn`] and re-chunks the
//! content after every append, handing a [`Snapshot`] to a sink each time.
//! [`StreamConsumer`] runs the same loop on a dedicated thread and delivers
//! the snapshots over a bounded channel.
//!
//! # Cancellation
//!
//! The actor never blocks inside the transport. A reader thread makes the
//! blocking reads and forwards each result; the consumer thread waits on
//! either the next result or the cancel signal, so a cancel ends the turn at
//! once even while a read is stalled. The reader thread exits, dropping the
//! transport, as soon as its pending read returns.
//!
//! # Termination
//!
//! | Cause                          | Status                               |
//! |--------------------------------|--------------------------------------|
//! | `[DONE]` frame                 | `Completed(Done)`                    |
//! | transport ends without `[DONE]`| `Completed(TransportEnded)`          |
//! | sink stops / cancel requested  | `Completed(Cancelled)`               |
//! | transport read fails           | `Failed(error)`, content → notice    |
//!
//! After the terminal status no further deltas are appended.

use crate::chunk::{chunk, Chunker, RenderUnit};
use crate::config::ConsumerConfig;
use crate::conversation::{ContentReader, EndReason, MessageId, StreamStatus, Turn, TurnOutcome};
use crate::error::TransportError;
use crate::stream::{parse_line, Frame, LineDecoder, Transport};
use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Reads the reader thread may run ahead of the pipeline.
const READ_AHEAD: usize = 16;

/// One forwarded read.
type ChunkResult = Result<Option<Vec<u8>>, TransportError>;

/// A consistent view of the reply after one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The assistant message being filled.
    pub message_id: MessageId,
    /// Full content so far.
    pub content: String,
    /// `chunk(content)`.
    pub units: Vec<RenderUnit>,
    /// `Active` until the final snapshot.
    pub status: StreamStatus,
}

impl Snapshot {
    /// Check if more updates will follow.
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Receiver of snapshots produced by [`consume_stream`].
pub trait SnapshotSink {
    /// Deliver one snapshot. Returning `Break` stops the stream.
    fn send(&mut self, snapshot: Snapshot) -> ControlFlow<()>;

    /// Deliver the final snapshot. It is sent even after cancellation.
    fn finish(&mut self, snapshot: Snapshot) {
        let _ = self.send(snapshot);
    }

    /// Polled before and after every read; `true` stops the stream.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: FnMut(Snapshot) -> ControlFlow<()>> SnapshotSink for F {
    fn send(&mut self, snapshot: Snapshot) -> ControlFlow<()> {
        self(snapshot)
    }
}

/// How the read loop ended.
enum Ending {
    Finished(EndReason),
    Failed(String),
}

/// Per-turn pipeline state.
struct Pipeline {
    turn: Turn,
    decoder: LineDecoder,
    chunker: Chunker,
    lines: Vec<String>,
}

impl Pipeline {
    /// Parse buffered lines in order, appending every delta.
    fn drain_lines<S: SnapshotSink + ?Sized>(&mut self, sink: &mut S) -> Option<EndReason> {
        let mut lines = std::mem::take(&mut self.lines);
        let mut ending = None;

        for line in lines.drain(..) {
            match parse_line(&line) {
                Frame::ContentDelta(delta) => {
                    if sink.is_cancelled() {
                        ending = Some(EndReason::Cancelled);
                        break;
                    }
                    let content = self.turn.append(&delta);
                    self.chunker.update(&content);
                    let snapshot = Snapshot {
                        message_id: self.turn.message_id(),
                        units: self.chunker.units().to_vec(),
                        content,
                        status: StreamStatus::Active,
                    };
                    if sink.send(snapshot).is_break() {
                        ending = Some(EndReason::Cancelled);
                        break;
                    }
                }
                Frame::Done => {
                    ending = Some(EndReason::Done);
                    break;
                }
                Frame::Ignorable => {}
            }
        }

        // Reuse the allocation.
        lines.clear();
        self.lines = lines;
        ending
    }
}

/// Consume a transport until `[DONE]`, end of stream, failure or cancellation.
///
/// The sink receives one active snapshot per content delta and a final
/// snapshot carrying the terminal status. The returned outcome matches the
/// final snapshot.
pub fn consume_stream<T, S>(
    mut transport: T,
    turn: Turn,
    config: &ConsumerConfig,
    sink: &mut S,
) -> TurnOutcome
where
    T: Transport,
    S: SnapshotSink + ?Sized,
{
    let message_id = turn.message_id();
    debug!(reply = %message_id, "stream started");

    let mut pipeline = Pipeline {
        turn,
        decoder: LineDecoder::new(),
        chunker: Chunker::new(),
        lines: Vec::new(),
    };

    let ending = loop {
        if sink.is_cancelled() {
            break Ending::Finished(EndReason::Cancelled);
        }

        let read = transport.next_chunk();
        if sink.is_cancelled() {
            break Ending::Finished(EndReason::Cancelled);
        }

        match read {
            Ok(Some(bytes)) => {
                pipeline.decoder.feed_into(&bytes, &mut pipeline.lines);
                if let Some(reason) = pipeline.drain_lines(sink) {
                    break Ending::Finished(reason);
                }
            }
            Ok(None) => {
                if let Some(last) = pipeline.decoder.finish() {
                    pipeline.lines.push(last);
                }
                let reason = pipeline
                    .drain_lines(sink)
                    .unwrap_or(EndReason::TransportEnded);
                break Ending::Finished(reason);
            }
            Err(e) => {
                warn!(reply = %message_id, error = %e, "stream transport failed");
                break Ending::Failed(e.to_string());
            }
        }
    };
    // Dropping the transport here terminates the underlying read.
    drop(transport);

    let outcome = match ending {
        Ending::Finished(reason) => pipeline.turn.complete(reason),
        Ending::Failed(error) => {
            pipeline
                .turn
                .fail(error, &config.error_notice, config.notice_policy)
        }
    };
    debug!(reply = %message_id, status = ?outcome.status, bytes = outcome.content.len(), "stream finished");

    sink.finish(Snapshot {
        message_id,
        units: chunk(&outcome.content),
        content: outcome.content.clone(),
        status: outcome.status.clone(),
    });
    outcome
}

/// Sink that forwards snapshots over a channel.
struct ChannelSink {
    sender: Sender<Snapshot>,
    cancel: Arc<AtomicBool>,
}

impl SnapshotSink for ChannelSink {
    fn send(&mut self, snapshot: Snapshot) -> ControlFlow<()> {
        if self.is_cancelled() {
            return ControlFlow::Break(());
        }
        match self.sender.send(snapshot) {
            Ok(()) => ControlFlow::Continue(()),
            // Receiver dropped, nobody is watching any more.
            Err(_) => ControlFlow::Break(()),
        }
    }

    fn finish(&mut self, snapshot: Snapshot) {
        let _ = self.sender.send(snapshot);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Make blocking reads and forward them until the stream is over or the
/// consumer is gone.
fn forward_reads<T: Transport>(mut transport: T, chunks: &Sender<ChunkResult>, cancel: &AtomicBool) {
    while !cancel.load(Ordering::Relaxed) {
        let read = transport.next_chunk();
        let last = !matches!(read, Ok(Some(_)));
        if chunks.send(read).is_err() || last {
            break;
        }
    }
    debug!("reader finished");
}

/// Transport fed by the reader thread. A cancel signal ends a wait early.
struct ForwardedTransport {
    chunks: Receiver<ChunkResult>,
    cancel: Receiver<()>,
}

impl Transport for ForwardedTransport {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        select! {
            recv(self.chunks) -> read => read.unwrap_or_else(|_| Err(TransportError::Closed)),
            // The read loop sees the cancel flag and stops.
            recv(self.cancel) -> _ => Ok(None),
        }
    }
}

/// Consumer actor: runs [`consume_stream`] on its own thread.
///
/// Drain [`StreamConsumer::receiver`] until it disconnects, then call
/// [`StreamConsumer::join`] for the outcome to seal into the conversation.
pub struct StreamConsumer {
    /// Handle to the consumer thread.
    handle: Option<JoinHandle<TurnOutcome>>,
    /// Flag to request cancellation.
    cancel: Arc<AtomicBool>,
    /// Wakes the consumer thread out of a wait for the next read.
    cancel_tx: Sender<()>,
    /// Receiver for snapshots.
    snapshot_rx: Receiver<Snapshot>,
    /// Live view of the accumulated content.
    reader: ContentReader,
    /// The assistant message being filled.
    message_id: MessageId,
    /// Notice used if the thread dies.
    error_notice: String,
}

impl StreamConsumer {
    /// Spawn the reader and consumer threads for `turn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn a thread.
    pub fn spawn<T>(transport: T, turn: Turn, config: ConsumerConfig) -> io::Result<Self>
    where
        T: Transport + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let (cancel_tx, cancel_rx) = bounded(1);
        let (chunk_tx, chunk_rx) = bounded(READ_AHEAD);
        let (snapshot_tx, snapshot_rx) = bounded(config.snapshot_capacity.max(1));
        let reader = turn.reader();
        let message_id = turn.message_id();
        let error_notice = config.error_notice.clone();

        let reader_cancel = Arc::clone(&cancel);
        // Detached: a stalled read must not hold up the consumer.
        thread::Builder::new()
            .name("fadestream-reader".to_string())
            .spawn(move || forward_reads(transport, &chunk_tx, &reader_cancel))?;

        let forwarded = ForwardedTransport {
            chunks: chunk_rx,
            cancel: cancel_rx,
        };
        let mut sink = ChannelSink {
            sender: snapshot_tx,
            cancel: Arc::clone(&cancel),
        };
        let handle = thread::Builder::new()
            .name("fadestream-consumer".to_string())
            .spawn(move || consume_stream(forwarded, turn, &config, &mut sink))?;

        Ok(Self {
            handle: Some(handle),
            cancel,
            cancel_tx,
            snapshot_rx,
            reader,
            message_id,
            error_notice,
        })
    }

    /// The assistant message being filled.
    pub const fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// Get a reference to the snapshot receiver.
    ///
    /// Use this with `select!` alongside input and tick receivers.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Snapshot> {
        &self.snapshot_rx
    }

    /// Read the accumulated content without waiting for a snapshot.
    pub fn content(&self) -> String {
        self.reader.snapshot()
    }

    /// Drain pending snapshots and keep only the newest.
    ///
    /// Returns `None` if nothing new arrived.
    pub fn poll_latest(&self) -> Option<Snapshot> {
        let mut latest = None;
        loop {
            match self.snapshot_rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }

    /// Check if the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the stream. Accumulated content is kept.
    ///
    /// Takes effect even while a read is blocked; the turn then ends as
    /// `Completed(Cancelled)` without waiting for the transport.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
        // Full means a wake-up is already pending.
        let _ = self.cancel_tx.try_send(());
    }

    /// Wait for the thread and return the outcome.
    ///
    /// Pending snapshots are discarded so the thread cannot block on a full
    /// channel.
    pub fn join(mut self) -> TurnOutcome {
        let Some(handle) = self.handle.take() else {
            return self.lost_outcome("consumer already joined");
        };
        while !handle.is_finished() {
            // Unblock a sender waiting on a full channel.
            if self.snapshot_rx.recv().is_err() {
                break;
            }
        }
        match handle.join() {
            Ok(outcome) => outcome,
            Err(_) => self.lost_outcome("consumer thread panicked"),
        }
    }

    fn lost_outcome(&self, reason: &str) -> TurnOutcome {
        warn!(reply = %self.message_id, reason, "stream consumer lost");
        TurnOutcome {
            message_id: self.message_id,
            content: self.error_notice.clone(),
            status: StreamStatus::Failed(reason.to_string()),
        }
    }
}

impl Drop for StreamConsumer {
    fn drop(&mut self) {
        self.cancel();
    }
}
