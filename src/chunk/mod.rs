//! Chunking: turning message text into animatable render units.
//!
//! This module contains:
//! - [`RenderUnit`]: a typed fragment (word, space or newline)
//! - [`chunk`]: the pure tokenizer, recomputed on every content update
//! - [`Chunker`]: an incremental tokenizer that only revisits the last line
//!
//! Both produce the same output. Growing the input never changes units that
//! were already emitted, except that the final word may get longer.

mod chunker;
mod unit;

pub use chunker::{chunk, ChunkUpdate, Chunker};
pub use unit::{join_units, RenderUnit, UnitKind};
