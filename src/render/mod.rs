//! Render: turning a conversation into flicker-free terminal output.
//!
//! - [`Rgb`], [`Style`]: colors and modifiers
//! - [`plan`], [`FadeClock`]: which units are entering and how opaque they are
//! - [`OutputBuffer`]: the single-write ANSI buffer
//! - [`ChatView`]: wrapping and drawing a whole conversation
//!
//! A terminal cell has no alpha channel, so an entering unit is drawn in a
//! color blended between the background and the text color.

mod fade;
mod output;
mod style;
mod view;

pub use fade::{plan, FadeClock, FadeConfig, Phase, PlannedUnit};
pub use output::OutputBuffer;
pub use style::{Modifiers, Rgb, Style};
pub use view::{ChatView, Row, Span, ViewConfig};
