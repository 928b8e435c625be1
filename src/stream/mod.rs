//! Stream decoding: from raw transport bytes to content deltas.
//!
//! ```text
//! ┌───────────┐  bytes   ┌─────────────┐  lines   ┌─────────────┐  Frame
//! │ Transport │ ───────▶ │ LineDecoder │ ───────▶ │ parse_line  │ ───────▶
//! └───────────┘          └─────────────┘          └─────────────┘
//! ```
//!
//! Each stage is strictly sequential and preserves arrival order.

mod decoder;
mod frame;
mod transport;

pub use decoder::LineDecoder;
pub use frame::{parse_line, Frame, DATA_PREFIX, DONE_SENTINEL};
pub use transport::{ReadTransport, ScriptedTransport, Transport, DEFAULT_READ_CHUNK};
