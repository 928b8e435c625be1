//! Chat View: lays out a conversation and draws it as ANSI output.
//!
//! Every repaint draws the bottom of the conversation into a fixed region.
//! Rows are overwritten in place and erased to the end of line afterwards,
//! never cleared first, so a repaint cannot flicker.
//!
//! - User messages are bold, one row per source line.
//! - Finished replies are drawn verbatim: runs of spaces and indentation are
//!   kept, and rows wrap at spaces.
//! - The streaming reply is drawn from its render units; entering units are
//!   blended from the background towards the text color by their opacity.

use super::fade::{plan, FadeClock, Phase};
use super::output::OutputBuffer;
use super::style::{Modifiers, Rgb, Style};
use crate::chunk::{chunk, UnitKind};
use crate::conversation::{Conversation, Message, Role};
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Colors used by the view.
#[derive(Debug, Clone, Copy)]
pub struct ViewConfig {
    /// User message style.
    pub user: Style,
    /// Reply style.
    pub reply: Style,
    /// Style of a reply that failed.
    pub notice: Style,
    /// Blank rows between messages.
    pub gap: u16,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let base = Style::default();
        Self {
            user: base.with_fg(Rgb::WHITE).with_modifiers(Modifiers::BOLD),
            reply: base,
            notice: base.with_fg(Rgb::NOTICE),
            gap: 1,
        }
    }
}

/// A styled run of text within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text, never containing a newline.
    pub text: String,
    /// Style.
    pub style: Style,
}

/// One terminal row.
pub type Row = Vec<Span>;

/// Word-wrapping row builder.
///
/// Spaces are held back until the next word is placed, so rows never end
/// in a space and a wrapped row never starts with one. Spaces at the very
/// start of a source line are indentation and are placed as they are.
struct RowBuilder {
    rows: Vec<Row>,
    current: Row,
    col: usize,
    width: usize,
    pending_space: Option<(Style, usize)>,
}

impl RowBuilder {
    fn new(width: u16) -> Self {
        Self {
            rows: Vec::new(),
            current: Vec::new(),
            col: 0,
            width: usize::from(width.max(1)),
            pending_space: None,
        }
    }

    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.col = 0;
        self.pending_space = None;
    }

    fn push_span(&mut self, text: &str, style: Style, width: usize) {
        match self.current.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.current.push(Span {
                text: text.to_string(),
                style,
            }),
        }
        self.col += width;
    }

    /// Place a word, wrapping before it if it does not fit.
    fn push_word(&mut self, word: &str, style: Style) {
        let width = UnicodeWidthStr::width(word);
        let space = self.pending_space.map_or(0, |(_, n)| n);
        if self.col > 0 && self.col + space + width > self.width {
            self.break_row();
        }
        if let Some((space_style, n)) = self.pending_space.take() {
            self.push_span(&" ".repeat(n), space_style, n);
        }
        if width <= self.width {
            self.push_span(word, style, width);
            return;
        }
        // Wider than a whole row: hard-wrap by grapheme.
        for grapheme in word.graphemes(true) {
            let g_width = UnicodeWidthStr::width(grapheme);
            if self.col > 0 && self.col + g_width > self.width {
                self.break_row();
            }
            self.push_span(grapheme, style, g_width);
        }
    }

    /// Hold a space for the next word, unless at the start of a row.
    fn push_space(&mut self, style: Style) {
        if self.col > 0 {
            self.pending_space = Some((style, 1));
        }
    }

    /// Place a run of `count` spaces taken verbatim from the source.
    fn push_gap(&mut self, count: usize, style: Style) {
        if self.col == 0 {
            let indent = count.min(self.width);
            self.push_span(&" ".repeat(indent), style, indent);
        } else {
            self.pending_space = Some((style, count));
        }
    }

    /// Place one source line, keeping its spaces.
    fn push_verbatim(&mut self, line: &str, style: Style) {
        let mut rest = line;
        while !rest.is_empty() {
            let word = rest.trim_start_matches(' ');
            let gap = rest.len() - word.len();
            if gap > 0 {
                self.push_gap(gap, style);
            }
            let end = word.find(' ').unwrap_or(word.len());
            if end > 0 {
                self.push_word(&word[..end], style);
            }
            rest = &word[end..];
        }
    }

    fn finish(mut self) -> Vec<Row> {
        self.rows.push(self.current);
        self.rows
    }
}

/// Renders a [`Conversation`] into a fixed terminal region.
#[derive(Debug, Clone)]
pub struct ChatView {
    config: ViewConfig,
    top: u16,
    width: u16,
    height: u16,
}

impl ChatView {
    /// Create a view covering `height` rows starting at row `top`.
    pub fn new(top: u16, width: u16, height: u16) -> Self {
        Self::with_config(top, width, height, ViewConfig::default())
    }

    /// Create a view with custom colors.
    pub const fn with_config(top: u16, width: u16, height: u16, config: ViewConfig) -> Self {
        Self {
            config,
            top,
            width,
            height,
        }
    }

    /// Move or resize the region.
    pub fn set_area(&mut self, top: u16, width: u16, height: u16) {
        self.top = top;
        self.width = width;
        self.height = height;
    }

    /// Region width.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Region height.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Lay out every message into rows.
    pub fn layout(&self, conversation: &Conversation, clock: &FadeClock, now: Instant) -> Vec<Row> {
        let mut rows = Vec::new();
        for (i, message) in conversation.messages().iter().enumerate() {
            if i > 0 {
                rows.extend(std::iter::repeat_with(Vec::new).take(usize::from(self.config.gap)));
            }
            rows.extend(self.layout_message(message, clock, now));
        }
        rows
    }

    fn layout_message(&self, message: &Message, clock: &FadeClock, now: Instant) -> Vec<Row> {
        match message.role {
            Role::User => {
                let mut builder = RowBuilder::new(self.width);
                for (i, line) in message.content.split('\n').enumerate() {
                    if i > 0 {
                        builder.break_row();
                    }
                    for (j, word) in line.split(' ').filter(|w| !w.is_empty()).enumerate() {
                        if j > 0 {
                            builder.push_space(self.config.user);
                        }
                        builder.push_word(word, self.config.user);
                    }
                }
                builder.finish()
            }
            Role::Assistant => {
                let style = if message.status.is_failed() {
                    self.config.notice
                } else {
                    self.config.reply
                };
                let mut builder = RowBuilder::new(self.width);
                if !message.is_streaming() {
                    for (i, line) in message.content.split('\n').enumerate() {
                        if i > 0 {
                            builder.break_row();
                        }
                        builder.push_verbatim(line, style);
                    }
                    return builder.finish();
                }

                let units = chunk(&message.content);
                for planned in plan(&units, true, clock.settled(now)) {
                    let unit_style = match planned.phase {
                        Phase::Settled => style,
                        Phase::Entering => {
                            let opacity = clock.opacity(planned.index, now);
                            style.with_fg(style.bg.lerp(style.fg, opacity))
                        }
                    };
                    match planned.unit.kind {
                        UnitKind::Word => builder.push_word(&planned.unit.text, unit_style),
                        UnitKind::Space => builder.push_space(unit_style),
                        UnitKind::Newline => builder.break_row(),
                    }
                }
                builder.finish()
            }
        }
    }

    /// Draw the bottom of the conversation into `out`.
    pub fn render(
        &self,
        conversation: &Conversation,
        clock: &FadeClock,
        now: Instant,
        out: &mut OutputBuffer,
    ) {
        let rows = self.layout(conversation, clock, now);
        let height = usize::from(self.height);
        let first = rows.len().saturating_sub(height);

        let mut visible = rows[first..].iter();
        for offset in 0..self.height {
            out.cursor_move(0, self.top + offset);
            out.set_style(self.config.reply);
            if let Some(row) = visible.next() {
                for span in row {
                    out.set_style(span.style);
                    out.write_str(&span.text);
                }
                out.set_style(self.config.reply);
            }
            out.clear_to_eol();
        }
        out.reset_attrs();
    }
}
