//! Terminal backends for the controller's side effects and a one-line
//! status renderer.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use pomotimer_core::{
    AudioSink, Chime, Event, Mode, NotifyError, Permission, SystemNotifier, Theme, ToggleLabel,
};

const BAR_WIDTH: usize = 20;

/// Rings the terminal bell in place of the synthesized chime.
pub struct TerminalBell;

impl AudioSink for TerminalBell {
    fn play(&mut self, _chime: &Chime) -> Result<(), NotifyError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| NotifyError::AudioUnavailable(e.to_string()))
    }
}

/// Permission state shared between the notifier and the session loop,
/// which collects the user's answer from stdin.
#[derive(Debug, Default)]
pub struct PermissionPrompt {
    permission: Cell<Permission>,
    pending: Cell<bool>,
}

impl PermissionPrompt {
    pub fn new(permission: Permission) -> Rc<Self> {
        Rc::new(Self {
            permission: Cell::new(permission),
            pending: Cell::new(false),
        })
    }

    pub fn permission(&self) -> Permission {
        self.permission.get()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Record the user's answer. Returns `None` if `line` is not a yes/no.
    pub fn answer(&self, line: &str) -> Option<Permission> {
        let permission = match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Permission::Granted,
            "n" | "no" => Permission::Denied,
            _ => return None,
        };
        self.permission.set(permission);
        self.pending.set(false);
        Some(permission)
    }
}

/// Prints completion notifications inline.
pub struct TerminalNotifier {
    prompt: Rc<PermissionPrompt>,
}

impl TerminalNotifier {
    pub fn new(prompt: Rc<PermissionPrompt>) -> Self {
        Self { prompt }
    }
}

impl SystemNotifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.prompt.permission()
    }

    fn request_permission(&mut self) {
        if self.prompt.pending.replace(true) {
            return;
        }
        println!("\nShow a notification when a session ends? [y/n]");
    }

    fn show(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        let mut out = std::io::stdout();
        writeln!(out, "\n🔔 {title} {body}")
            .and_then(|()| out.flush())
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))
    }
}

/// Latest state of everything the controller has told us to show.
#[derive(Debug, Clone)]
pub struct Screen {
    text: String,
    title: String,
    fraction: f64,
    theme: Theme,
    toggle: ToggleLabel,
    active_mode: Mode,
    modes_enabled: bool,
    today: u64,
    total: u64,
    complete: bool,
    bump: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            text: "00:00".into(),
            title: String::new(),
            fraction: 1.0,
            theme: Theme::Work,
            toggle: ToggleLabel::Start,
            active_mode: Mode::Work,
            modes_enabled: true,
            today: 0,
            total: 0,
            complete: false,
            bump: false,
        }
    }
}

impl Screen {
    /// Fold one event into the view. Returns a line to print above the
    /// status line, if the event warrants one.
    pub fn apply(&mut self, event: &Event) -> Option<String> {
        match event {
            Event::DisplayUpdated { text, title, .. } => {
                self.text = text.clone();
                self.title = title.clone();
            }
            Event::ProgressUpdated { fraction, .. } => self.fraction = *fraction,
            Event::ThemeChanged { theme, .. } => self.theme = *theme,
            Event::ControlsUpdated {
                toggle,
                modes_enabled,
                active_mode,
            } => {
                self.toggle = *toggle;
                self.modes_enabled = *modes_enabled;
                self.active_mode = *active_mode;
            }
            Event::CompletionPulse { active } => self.complete = *active,
            Event::StatsUpdated { today, total } => {
                self.today = *today;
                self.total = *total;
            }
            Event::StatsBump { active } => self.bump = *active,
            Event::SessionCompleted { mode, at } => {
                return Some(format!(
                    "{} finished at {}",
                    mode.label(),
                    at.format("%H:%M")
                ));
            }
        }
        None
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn progress_bar(&self) -> String {
        let filled = (self.fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
    }

    pub fn status_line(&self) -> String {
        let mode = match self.theme {
            Theme::Work => self.active_mode.label().to_uppercase(),
            Theme::Break => format!("{} ☕", self.active_mode.label().to_uppercase()),
        };
        let action = match self.toggle {
            ToggleLabel::Start => "[s] start",
            ToggleLabel::Pause => "[s] pause",
            ToggleLabel::Resume => "[s] resume",
        };
        let today = if self.bump {
            format!("*{}*", self.today)
        } else {
            self.today.to_string()
        };
        let done = if self.complete { " ✔" } else { "" };
        let modes = if self.modes_enabled { "" } else { " (modes locked)" };
        format!(
            "{mode} {}{done} {} {action}{modes} | today {today} · total {}",
            self.text,
            self.progress_bar(),
            self.total
        )
    }

    /// Apply a batch of events and redraw the status line and title.
    pub fn render(&mut self, events: &[Event], out: &mut impl Write) -> std::io::Result<()> {
        for event in events {
            if let Some(line) = self.apply(event) {
                writeln!(out, "\r\x1b[2K{line}")?;
            }
        }
        write!(out, "\x1b]0;{}\x07\r\x1b[2K{}", self.title(), self.status_line())?;
        out.flush()
    }
}
