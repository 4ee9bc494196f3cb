use serde::{Deserialize, Serialize};

use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

/// Strings shown in the completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub title: &'static str,
    pub work_complete: &'static str,
    pub break_complete: &'static str,
}

impl Messages {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                title: "Pomodoro complete!",
                work_complete: "Nice work! 🍅 Time for a break.",
                break_complete: "Break's over! Time to focus again.",
            },
            Locale::Ko => Self {
                title: "포모도로 완료!",
                work_complete: "수고했어요! 🍅 휴식 시간입니다.",
                break_complete: "휴식 끝! 다시 집중할 시간이에요.",
            },
        }
    }

    /// Body text for the session that just finished.
    pub fn body_for(&self, finished: Mode) -> &'static str {
        if finished.is_break() {
            self.break_complete
        } else {
            self.work_complete
        }
    }
}
