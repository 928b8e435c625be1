//! Line decoder: turns raw byte chunks into complete text lines.
//!
//! Network chunk boundaries carry no meaning. A chunk may end in the middle
//! of a multi-byte character or in the middle of a line, so the decoder keeps
//! two carry-overs between calls:
//!
//! - the undecoded bytes of an incomplete UTF-8 sequence
//! - the decoded text of an unterminated line
//!
//! A line is only emitted once its `\n` terminator (or the end of the stream)
//! has been seen. Emitted lines never contain `\n`.

use tracing::{debug, trace};

/// The line terminator.
const TERMINATOR: char = '\n';

/// Longest possible UTF-8 sequence.
const MAX_UTF8_LEN: usize = 4;

/// Streaming byte-to-line decoder.
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    /// Bytes of a character split across chunks.
    partial: Vec<u8>,
    /// Decoded text of the current unterminated line.
    carry: String,
}

impl LineDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and collect the lines it completes, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        self.feed_into(chunk, &mut lines);
        lines
    }

    /// Feed one chunk, pushing completed lines to `lines`.
    pub fn feed_into(&mut self, chunk: &[u8], lines: &mut Vec<String>) {
        if chunk.is_empty() {
            return;
        }

        let before = self.carry.len();
        if self.partial.is_empty() {
            self.decode(chunk);
        } else {
            let mut bytes = std::mem::take(&mut self.partial);
            bytes.extend_from_slice(chunk);
            self.decode(&bytes);
        }

        // Only the newly decoded text can contain terminators.
        if self.carry[before..].contains(TERMINATOR) {
            self.split_lines(lines);
        }
    }

    /// Flush the carry-over at end of stream.
    ///
    /// An incomplete trailing character is decoded lossily. Returns `None`
    /// when nothing non-empty remains.
    pub fn finish(&mut self) -> Option<String> {
        if !self.partial.is_empty() {
            debug!(bytes = self.partial.len(), "incomplete utf-8 sequence at end of stream");
            self.carry.push_str(&String::from_utf8_lossy(&self.partial));
            self.partial.clear();
        }
        if self.carry.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.carry))
        }
    }

    /// Number of bytes currently held back (partial character plus carry-over).
    pub fn pending(&self) -> usize {
        self.partial.len() + self.carry.len()
    }

    /// Check if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.partial.is_empty() && self.carry.is_empty()
    }

    /// Decode as much of `bytes` as possible onto the carry-over.
    ///
    /// Invalid sequences become U+FFFD. An incomplete sequence at the very end
    /// is held back for the next chunk.
    fn decode(&mut self, mut bytes: &[u8]) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.carry.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    self.carry.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            debug!(bytes = len, "replacing invalid utf-8 sequence");
                            self.carry.push(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[len..];
                        }
                        None => {
                            debug_assert!(rest.len() < MAX_UTF8_LEN);
                            self.partial.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Move every terminated line out of the carry-over.
    fn split_lines(&mut self, lines: &mut Vec<String>) {
        let Some(last) = self.carry.rfind(TERMINATOR) else {
            return;
        };
        let rest = self.carry.split_off(last + TERMINATOR.len_utf8());
        let complete = std::mem::replace(&mut self.carry, rest);

        for line in complete[..last].split(TERMINATOR) {
            trace!(len = line.len(), "line complete");
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "data: {\"a\":\"héllo\"}\n\ndata: 世界 👋\nevent: ping\ndata: [DONE]\n";

    fn feed_all(decoder: &mut LineDecoder, chunks: &[&[u8]]) -> Vec<String> {
        let mut lines = Vec::new();
        for chunk in chunks {
            decoder.feed_into(chunk, &mut lines);
        }
        lines.extend(decoder.finish());
        lines
    }

    #[test]
    fn test_decoder_single_chunk() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"one\ntwo\nthr");
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.finish().as_deref(), Some("thr"));
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_decoder_holds_line_until_terminated() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"data: hel").is_empty());
        assert!(decoder.feed(b"lo").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec!["data: hello"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_decoder_blank_lines() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"a\n\n\nb\n"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_decoder_split_multibyte() {
        let bytes = "é世👋\n".as_bytes();
        let mut decoder = LineDecoder::new();
        let mut lines = Vec::new();
        for byte in bytes {
            decoder.feed_into(std::slice::from_ref(byte), &mut lines);
        }
        assert_eq!(lines, vec!["é世👋"]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_decoder_every_split_point() {
        let bytes = REFERENCE.as_bytes();
        let expected = feed_all(&mut LineDecoder::new(), &[bytes]);

        for split in 0..=bytes.len() {
            let (a, b) = bytes.split_at(split);
            let lines = feed_all(&mut LineDecoder::new(), &[a, b]);
            assert_eq!(lines, expected, "split at {split}");
        }
    }

    #[test]
    fn test_decoder_invalid_bytes_replaced() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"ab\xffcd\n");
        assert_eq!(lines, vec!["ab\u{fffd}cd"]);
    }

    #[test]
    fn test_decoder_truncated_character_at_end() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"x\xe4\xb8").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("x\u{fffd}"));
    }

    #[test]
    fn test_decoder_empty_chunks_ignored() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"").is_empty());
        assert!(decoder.is_empty());
        assert_eq!(decoder.finish(), None);
    }
}
