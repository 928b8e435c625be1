//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use super::style::{Modifiers, Rgb, Style};
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// A whole frame is accumulated here, then flushed in a single `write()`
/// so the terminal never shows a half-drawn frame.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
    /// Style most recently emitted, to skip redundant SGR sequences.
    current: Option<Style>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            current: None,
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
        self.current = None;
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move cursor to (x, y) position (0-indexed; ANSI is 1-indexed).
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        // Writing to a Vec cannot fail.
        let _ = write!(self.data, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1);
    }

    /// Set foreground color (true color).
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Set background color (true color).
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Switch to `style`, emitting only what changed.
    pub fn set_style(&mut self, style: Style) {
        if self.current == Some(style) {
            return;
        }
        let modifiers_changed = self.current.is_none_or(|c| c.modifiers != style.modifiers);
        if modifiers_changed {
            self.reset_attrs();
            self.set_modifiers(style.modifiers);
            self.set_fg(style.fg);
            self.set_bg(style.bg);
        } else if let Some(current) = self.current {
            if current.fg != style.fg {
                self.set_fg(style.fg);
            }
            if current.bg != style.bg {
                self.set_bg(style.bg);
            }
        }
        self.current = Some(style);
    }

    /// Emit SGR codes for `modifiers`.
    fn set_modifiers(&mut self, modifiers: Modifiers) {
        if modifiers.contains(Modifiers::BOLD) {
            self.data.extend_from_slice(b"\x1b[1m");
        }
        if modifiers.contains(Modifiers::DIM) {
            self.data.extend_from_slice(b"\x1b[2m");
        }
        if modifiers.contains(Modifiers::ITALIC) {
            self.data.extend_from_slice(b"\x1b[3m");
        }
        if modifiers.contains(Modifiers::UNDERLINE) {
            self.data.extend_from_slice(b"\x1b[4m");
        }
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
        self.current = None;
    }

    /// Erase from the cursor to the end of the line, in the current background.
    #[inline]
    pub fn clear_to_eol(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_move_is_one_indexed() {
        let mut out = OutputBuffer::new();
        out.cursor_move(0, 0);
        assert_eq!(out.as_bytes(), b"\x1b[1;1H");
    }

    #[test]
    fn test_set_style_skips_repeats() {
        let mut out = OutputBuffer::new();
        let style = Style::default();
        out.set_style(style);
        let first = out.len();
        out.set_style(style);
        assert_eq!(out.len(), first);

        out.set_style(style.with_fg(Rgb::WHITE));
        let emitted = &out.as_bytes()[first..];
        assert_eq!(emitted, b"\x1b[38;2;255;255;255m");
    }

    #[test]
    fn test_set_style_modifiers_reset() {
        let mut out = OutputBuffer::new();
        out.set_style(Style::default().with_modifiers(Modifiers::BOLD));
        let text = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(text.starts_with("\x1b[0m\x1b[1m"));
    }

    #[test]
    fn test_flush_to_writer() {
        let mut out = OutputBuffer::new();
        out.write_str("hello");
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"hello");
        out.clear();
        assert!(out.is_empty());
    }
}
