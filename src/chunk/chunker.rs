//! Chunker: splits a growing message into words, spaces and newlines.
//!
//! Splitting is purely positional and left to right, so tokenizing a longer
//! version of the same text never rewrites units that were already final.
//! Only the trailing word may grow. Nothing here trims the input as a whole:
//! a trailing space or newline must survive until the next token arrives,
//! otherwise a later re-tokenization would disagree with an earlier one.

use super::unit::RenderUnit;

/// Split `text` into render units.
///
/// Lines are separated by exactly one newline unit. Within a line, every
/// non-empty word becomes a word unit and consecutive words are separated by
/// a single space unit. Runs of spaces collapse into one space unit, and
/// spaces at the start or end of a line produce nothing.
///
/// # Example
///
/// ```
/// use fadestream::chunk::{chunk, RenderUnit};
///
/// assert_eq!(
///     chunk("Hi there"),
///     vec![RenderUnit::word("Hi"), RenderUnit::space(), RenderUnit::word("there")]
/// );
/// ```
pub fn chunk(text: &str) -> Vec<RenderUnit> {
    let mut units = Vec::new();
    chunk_into(text, &mut units);
    units
}

/// Append the units of `text` to `units`.
fn chunk_into(text: &str, units: &mut Vec<RenderUnit>) {
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            units.push(RenderUnit::newline());
        }
        push_line(line, units);
    }
}

/// Append the words of a single line, separated by spaces.
fn push_line(line: &str, units: &mut Vec<RenderUnit>) {
    let mut words = line.split(' ').filter(|word| !word.is_empty());
    if let Some(first) = words.next() {
        units.push(RenderUnit::word(first));
        for word in words {
            units.push(RenderUnit::space());
            units.push(RenderUnit::word(word));
        }
    }
}

/// Outcome of an incremental update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkUpdate {
    /// Leading units that are identical to the previous update.
    pub stable: usize,
    /// Total units after the update.
    pub total: usize,
    /// Whether the new text did not extend the previous text.
    pub reset: bool,
}

impl ChunkUpdate {
    /// Number of units that are new or changed.
    pub const fn changed(&self) -> usize {
        self.total - self.stable
    }
}

/// Incremental chunker.
///
/// Keeps the units of the previous text and only re-tokenizes from the start
/// of the last line. The result is always identical to [`chunk`] on the full
/// text; when the text is not an extension of the previous one the state is
/// discarded and rebuilt.
#[derive(Debug, Default, Clone)]
pub struct Chunker {
    /// Units of `source`.
    units: Vec<RenderUnit>,
    /// The text the units were computed from.
    source: String,
    /// Byte offset in `source` where the last line starts.
    tail_start: usize,
    /// Index of the first unit belonging to the last line.
    tail_units: usize,
}

impl Chunker {
    /// Create an empty chunker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current units.
    pub fn units(&self) -> &[RenderUnit] {
        &self.units
    }

    /// The text the current units were computed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Forget all state.
    pub fn clear(&mut self) {
        self.units.clear();
        self.source.clear();
        self.tail_start = 0;
        self.tail_units = 0;
    }

    /// Re-tokenize after the text changed.
    pub fn update(&mut self, text: &str) -> ChunkUpdate {
        let reset = !text.starts_with(self.source.as_str());
        if reset {
            self.clear();
        }

        let previous_tail: Vec<RenderUnit> = self.units.drain(self.tail_units..).collect();
        let tail = &text[self.tail_start..];
        chunk_into(tail, &mut self.units);

        let unchanged = previous_tail
            .iter()
            .zip(&self.units[self.tail_units..])
            .take_while(|(old, new)| old == new)
            .count();
        let stable = self.tail_units + unchanged;

        if let Some(pos) = tail.rfind('\n') {
            self.tail_start += pos + 1;
            self.tail_units = self
                .units
                .iter()
                .rposition(RenderUnit::is_newline)
                .map_or(0, |i| i + 1);
        }

        self.source.clear();
        self.source.push_str(text);

        ChunkUpdate {
            stable,
            total: self.units.len(),
            reset,
        }
    }
}
