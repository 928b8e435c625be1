//! Fade: deciding which units animate and how far along they are.
//!
//! [`plan`] is the stateless part: given the units, whether the message is
//! still streaming and how many leading units have already settled, it marks
//! every unit as [`Phase::Settled`] or [`Phase::Entering`]. Calling it twice
//! with the same input gives the same answer.
//!
//! [`FadeClock`] is the presentation-side memory that a keyed UI tree would
//! otherwise provide: it remembers when each unit index first appeared and
//! turns that into an opacity. Because chunking only ever appends units (or
//! grows the last word), an index keeps its identity for the whole reply and
//! an already visible word never fades in twice.

use crate::chunk::RenderUnit;
use std::time::{Duration, Instant};

/// Configuration for the fade-in animation.
#[derive(Debug, Clone, Copy)]
pub struct FadeConfig {
    /// How long a unit takes to become fully opaque.
    pub duration: Duration,
    /// Repaint interval while something is fading.
    pub frame_interval: Duration,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(750),
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// Render phase of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Drawn statically.
    Settled,
    /// Fading in.
    Entering,
}

/// A unit with its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedUnit<'a> {
    /// Position in the unit sequence (the unit's identity).
    pub index: usize,
    /// The unit.
    pub unit: &'a RenderUnit,
    /// How to draw it.
    pub phase: Phase,
}

/// Mark each unit as settled or entering.
///
/// When the stream is inactive everything is settled. Otherwise the first
/// `settled` units are settled and the rest are entering.
pub fn plan(units: &[RenderUnit], is_active: bool, settled: usize) -> Vec<PlannedUnit<'_>> {
    let boundary = if is_active { settled.min(units.len()) } else { units.len() };
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| PlannedUnit {
            index,
            unit,
            phase: if index < boundary { Phase::Settled } else { Phase::Entering },
        })
        .collect()
}

/// First-appearance times of units, by index.
#[derive(Debug, Clone, Default)]
pub struct FadeClock {
    config: FadeConfig,
    appeared: Vec<Instant>,
}

impl FadeClock {
    /// Create a clock with the given configuration.
    pub const fn new(config: FadeConfig) -> Self {
        Self {
            config,
            appeared: Vec::new(),
        }
    }

    /// The configuration.
    pub const fn config(&self) -> &FadeConfig {
        &self.config
    }

    /// Record units that appeared since the last call.
    ///
    /// If the sequence got shorter it belongs to a different message and the
    /// clock starts over.
    pub fn observe(&mut self, units: &[RenderUnit], now: Instant) {
        if units.len() < self.appeared.len() {
            self.appeared.clear();
        }
        let known = self.appeared.len();
        self.appeared
            .extend(std::iter::repeat_n(now, units.len() - known));
    }

    /// Forget everything (a new reply starts).
    pub fn reset(&mut self) {
        self.appeared.clear();
    }

    /// Number of units seen.
    pub fn len(&self) -> usize {
        self.appeared.len()
    }

    /// Check if no unit was seen.
    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty()
    }

    /// Opacity of unit `index` in `[0, 1]`. Unknown units are invisible.
    pub fn opacity(&self, index: usize, now: Instant) -> f32 {
        let Some(&appeared) = self.appeared.get(index) else {
            return 0.0;
        };
        if self.config.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(appeared);
        (elapsed.as_secs_f32() / self.config.duration.as_secs_f32()).min(1.0)
    }

    /// Number of leading units whose fade has finished.
    pub fn settled(&self, now: Instant) -> usize {
        // Appearance times are non-decreasing, so settled units form a prefix.
        self.appeared
            .partition_point(|&appeared| now.saturating_duration_since(appeared) >= self.config.duration)
    }

    /// Check if any unit is still fading.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.settled(now) < self.appeared.len()
    }
}
