//! Actor Model: the threads around a streaming reply.
//!
//! This module implements two small actors on crossbeam channels:
//! - **Stream Consumer**: reads the transport, decodes frames, accumulates
//!   content and publishes [`Snapshot`]s
//! - **Frame Ticker**: paces repaints while entering units fade in
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     Snapshot      ┌──────────────┐
//! │Consumer Thread │ ───────────────▶  │              │
//! └────────────────┘                   │   UI Loop    │
//!         ▲                            │              │
//!         │ bytes    ┌──────────────┐  │              │
//!   ┌───────────┐    │Ticker Thread │ ─┤     Tick     │
//!   │ Transport │    └──────────────┘  └──────────────┘
//!   └───────────┘
//! ```
//!
//! The consumer pipeline is strictly sequential: one reader, one turn.

mod consumer;
mod ticker;

pub use consumer::{consume_stream, Snapshot, SnapshotSink, StreamConsumer};
pub use ticker::{FrameTicker, Tick};
