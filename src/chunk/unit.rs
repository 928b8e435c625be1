//! Render units: the atomic fragments the presentation layer animates.

use std::fmt;

/// The kind of a render unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A run of non-space, non-newline characters.
    Word,
    /// The single space separating two words on the same line.
    Space,
    /// A line break between two source lines.
    Newline,
}

impl UnitKind {
    /// Short lowercase name, used in debug output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Space => "space",
            Self::Newline => "newline",
        }
    }
}

/// A typed fragment of text.
///
/// Concatenating the `text` of a unit sequence in order reconstructs the
/// source string, modulo the collapsing of repeated and edge spaces.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RenderUnit {
    /// What the unit is.
    pub kind: UnitKind,
    /// The unit's text.
    pub text: String,
}

impl RenderUnit {
    /// Create a word unit.
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Word,
            text: text.into(),
        }
    }

    /// Create a space unit.
    pub fn space() -> Self {
        Self {
            kind: UnitKind::Space,
            text: " ".to_string(),
        }
    }

    /// Create a newline unit.
    pub fn newline() -> Self {
        Self {
            kind: UnitKind::Newline,
            text: "\n".to_string(),
        }
    }

    /// Check if this unit is a word.
    #[inline]
    pub fn is_word(&self) -> bool {
        self.kind == UnitKind::Word
    }

    /// Check if this unit is a line break.
    #[inline]
    pub fn is_newline(&self) -> bool {
        self.kind == UnitKind::Newline
    }

    /// Whether `self` is `other` or a grown version of it.
    ///
    /// A trailing word can keep growing while tokens arrive; every other
    /// unit is final once emitted.
    pub fn extends(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text.starts_with(&other.text)
    }
}

impl fmt::Debug for RenderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.kind.as_str(), self.text)
    }
}

/// Concatenate unit texts in order.
pub fn join_units(units: &[RenderUnit]) -> String {
    let len = units.iter().map(|u| u.text.len()).sum();
    let mut out = String::with_capacity(len);
    for unit in units {
        out.push_str(&unit.text);
    }
    out
}
