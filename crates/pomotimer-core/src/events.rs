use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Readout, Theme, ToggleLabel};

/// Every visible change the controller makes produces an Event.
/// The presentation layer drains and renders them in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DisplayUpdated {
        readout: Readout,
        /// `MM:SS`
        text: String,
        /// Window/tab title mirroring the countdown.
        title: String,
    },
    ProgressUpdated {
        /// remaining / total, in `[0, 1]`.
        fraction: f64,
        dash_offset: f64,
    },
    ThemeChanged {
        mode: Mode,
        theme: Theme,
    },
    ControlsUpdated {
        toggle: ToggleLabel,
        modes_enabled: bool,
        active_mode: Mode,
    },
    CompletionPulse {
        active: bool,
    },
    StatsUpdated {
        today: u64,
        total: u64,
    },
    StatsBump {
        active: bool,
    },
    SessionCompleted {
        mode: Mode,
        at: DateTime<Local>,
    },
}

/// Inbound user and host events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    StartPausePressed,
    ResetPressed,
    ModeSelected { mode: Mode, duration_min: u64 },
    VisibilityChanged { hidden: bool },
    FirstInteraction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(Event::StatsUpdated { today: 2, total: 9 }).unwrap();
        assert_eq!(json["type"], "stats_updated");
        assert_eq!(json["total"], 9);
    }

    #[test]
    fn inputs_parse_from_json() {
        let input: Input =
            serde_json::from_str(r#"{"type":"mode_selected","mode":"short-break","duration_min":5}"#)
                .unwrap();
        assert_eq!(
            input,
            Input::ModeSelected {
                mode: Mode::ShortBreak,
                duration_min: 5
            }
        );
    }
}
