//! Readout and progress-ring derivation.
//!
//! Everything here is a pure function of remaining/total seconds so the
//! presentation layer can render however it likes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Radius of the progress ring in the original layout.
pub const DEFAULT_RING_RADIUS: f64 = 90.0;

/// Suffix appended to the countdown in the window title.
pub const TITLE_SUFFIX: &str = "🍅 Pomodoro";

/// Zero-padded minutes and seconds of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readout {
    pub minutes: u64,
    pub seconds: u64,
}

impl Readout {
    pub fn from_secs(remaining_secs: u64) -> Self {
        Self {
            minutes: remaining_secs / 60,
            seconds: remaining_secs % 60,
        }
    }

    /// `MM:SS`
    pub fn text(&self) -> String {
        format!("{:02}:{:02}", self.minutes, self.seconds)
    }

    /// `MM:SS - 🍅 Pomodoro`
    pub fn title(&self) -> String {
        format!("{} - {}", self.text(), TITLE_SUFFIX)
    }
}

/// Fraction of the session still remaining, in `[0, 1]`.
///
/// A zero total yields `1.0` instead of dividing by zero.
pub fn progress_fraction(remaining_secs: u64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 1.0;
    }
    (remaining_secs as f64 / total_secs as f64).clamp(0.0, 1.0)
}

/// Circular progress indicator of fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressRing {
    radius: f64,
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self::new(DEFAULT_RING_RADIUS)
    }
}

impl ProgressRing {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// Stroke offset for a given progress fraction: a full ring at `1.0`,
    /// an empty one at `0.0`.
    pub fn dash_offset(&self, fraction: f64) -> f64 {
        self.circumference() * (1.0 - fraction.clamp(0.0, 1.0))
    }
}
