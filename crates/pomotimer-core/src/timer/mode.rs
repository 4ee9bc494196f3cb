use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which kind of session the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

/// Visual styling applied to the progress ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Work,
    Break,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    /// Built-in duration in minutes, used when the configuration has none.
    pub fn default_minutes(self) -> u64 {
        match self {
            Mode::Work => 25,
            Mode::ShortBreak => 5,
            Mode::LongBreak => 15,
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            Mode::Work => Theme::Work,
            Mode::ShortBreak | Mode::LongBreak => Theme::Break,
        }
    }

    pub fn is_break(self) -> bool {
        self.theme() == Theme::Break
    }

    /// The tag carried by mode-selector controls.
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "focus" => Ok(Mode::Work),
            "short-break" | "short" => Ok(Mode::ShortBreak),
            "long-break" | "long" => Ok(Mode::LongBreak),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}
