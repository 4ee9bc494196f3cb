//! Timer controller.
//!
//! A single-threaded state machine. It owns the countdown, asks its
//! [`Scheduler`] for a one-second tick while running, and queues
//! [`Event`]s for the presentation layer. The host feeds user input in
//! through [`TimerController::handle`] and fired tasks through
//! [`TimerController::dispatch`].
//!
//! ## State Transitions
//!
//! ```text
//! stopped --start--> running --pause--> stopped
//!    ^                  |
//!    +--- complete -----+   (pause, side effects, reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TimerController::new(queue, clock, stats, emitter);
//! timer.handle(Input::StartPausePressed);
//! // In the host loop:
//! timer.run_due(Instant::now());
//! for event in timer.drain_events() { render(event) }
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::display::{progress_fraction, ProgressRing, Readout};
use super::mode::Mode;
use super::scheduler::{Scheduler, Task, TaskHandle, TaskQueue};
use crate::events::{Event, Input};
use crate::notify::NotificationEmitter;
use crate::stats::{StatsRecord, StatsTracker};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const COMPLETION_PULSE: Duration = Duration::from_millis(1500);
pub const STATS_BUMP: Duration = Duration::from_millis(200);

/// Label on the start/pause control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleLabel {
    Start,
    Pause,
    Resume,
}

/// Countdown state. `remaining_secs <= total_secs` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    /// When the view went inactive while running.
    pub hidden_at: Option<DateTime<Local>>,
}

impl TimerState {
    pub fn new(mode: Mode, duration_min: u64) -> Self {
        let total_secs = duration_min.saturating_mul(60);
        Self {
            mode,
            total_secs,
            remaining_secs: total_secs,
            running: false,
            hidden_at: None,
        }
    }

    pub fn progress(&self) -> f64 {
        progress_fraction(self.remaining_secs, self.total_secs)
    }
}

pub struct TimerController<S: Scheduler> {
    state: TimerState,
    /// Duration of the active mode selector, restored by reset.
    selected_min: u64,
    toggle: ToggleLabel,
    tick_handle: Option<TaskHandle>,
    scheduler: S,
    clock: Box<dyn Clock>,
    stats: StatsTracker,
    record: StatsRecord,
    notifier: NotificationEmitter,
    ring: ProgressRing,
    first_interaction_seen: bool,
    events: VecDeque<Event>,
}

impl<S: Scheduler> TimerController<S> {
    /// Create a controller in work mode with the built-in work duration.
    ///
    /// Loads the stats (applying the day rollover) and queues the initial
    /// render events.
    pub fn new(
        scheduler: S,
        clock: Box<dyn Clock>,
        mut stats: StatsTracker,
        notifier: NotificationEmitter,
    ) -> Self {
        let today = clock.today();
        let record = stats.load(today).unwrap_or_else(|e| {
            warn!(error = %e, "could not load stats, starting from zero");
            StatsRecord::empty(today)
        });
        let mode = Mode::default();
        let selected_min = mode.default_minutes();
        let mut controller = Self {
            state: TimerState::new(mode, selected_min),
            selected_min,
            toggle: ToggleLabel::Start,
            tick_handle: None,
            scheduler,
            clock,
            stats,
            record,
            notifier,
            ring: ProgressRing::default(),
            first_interaction_seen: false,
            events: VecDeque::new(),
        };
        controller.emit_all();
        controller
    }

    /// Use a different progress-ring radius.
    pub fn with_ring(mut self, ring: ProgressRing) -> Self {
        self.ring = ring;
        self.emit_progress();
        self
    }

    /// Start in `mode` with `duration_min` instead of the work default.
    pub fn with_mode(mut self, mode: Mode, duration_min: u64) -> Self {
        self.select_mode(mode, duration_min);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.state.total_secs
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn readout(&self) -> Readout {
        Readout::from_secs(self.state.remaining_secs)
    }

    pub fn toggle_label(&self) -> ToggleLabel {
        self.toggle
    }

    /// Mode selectors are only usable while stopped.
    pub fn modes_enabled(&self) -> bool {
        !self.state.running
    }

    pub fn stats(&self) -> StatsRecord {
        self.record
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn handle(&mut self, input: Input) {
        match input {
            Input::StartPausePressed => self.toggle(),
            Input::ResetPressed => self.reset(),
            Input::ModeSelected { mode, duration_min } => {
                self.select_mode(mode, duration_min);
            }
            Input::VisibilityChanged { hidden } => self.on_visibility_change(hidden),
            Input::FirstInteraction => self.on_first_interaction(),
        }
    }

    /// Run a task fired by the scheduler.
    pub fn dispatch(&mut self, task: Task) {
        match task {
            Task::Tick => self.tick(),
            Task::ClearCompletionPulse => self.push(Event::CompletionPulse { active: false }),
            Task::ClearStatsBump => self.push(Event::StatsBump { active: false }),
        }
    }

    /// Switch mode. Ignored while running or for a zero duration.
    ///
    /// Returns whether the selection took effect.
    pub fn select_mode(&mut self, mode: Mode, duration_min: u64) -> bool {
        if self.state.running {
            debug!(%mode, "mode change ignored while running");
            return false;
        }
        if duration_min == 0 {
            debug!(%mode, "mode change ignored: zero duration");
            return false;
        }
        self.selected_min = duration_min;
        self.state = TimerState::new(mode, duration_min);
        debug!(%mode, duration_min, "mode selected");
        self.emit_all();
        true
    }

    pub fn toggle(&mut self) {
        if self.state.running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.state.running = true;
        self.tick_handle = Some(self.scheduler.schedule_every(TICK_PERIOD, Task::Tick));
        self.toggle = ToggleLabel::Pause;
        debug!(mode = %self.state.mode, remaining = self.state.remaining_secs, "timer started");
        self.emit_controls();
    }

    pub fn pause(&mut self) {
        self.halt();
        self.toggle = ToggleLabel::Resume;
        debug!(remaining = self.state.remaining_secs, "timer paused");
        self.emit_controls();
    }

    pub fn reset(&mut self) {
        self.halt();
        self.state.total_secs = self.selected_min.saturating_mul(60);
        self.state.remaining_secs = self.state.total_secs;
        self.toggle = ToggleLabel::Start;
        self.emit_controls();
        self.emit_display();
    }

    /// One-second countdown step. Ticks that land while the view is hidden
    /// are dropped; the visibility correction accounts for that time.
    pub fn tick(&mut self) {
        if !self.state.running || self.state.hidden_at.is_some() {
            return;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        self.emit_display();
        if self.state.remaining_secs == 0 {
            self.complete();
        }
    }

    /// Run the completion side effects, then reset to the selected duration.
    pub fn complete(&mut self) {
        let mode = self.state.mode;
        self.halt();
        self.notifier.play_chime();

        self.push(Event::CompletionPulse { active: true });
        self.scheduler
            .schedule_once(COMPLETION_PULSE, Task::ClearCompletionPulse);

        if mode == Mode::Work {
            match self.stats.increment_on_completion(self.clock.today()) {
                Ok(record) => {
                    self.record = record;
                    self.emit_stats();
                    self.push(Event::StatsBump { active: true });
                    self.scheduler.schedule_once(STATS_BUMP, Task::ClearStatsBump);
                }
                Err(e) => warn!(error = %e, "could not record completed session"),
            }
        }

        let outcome = self.notifier.notify_completion(mode);
        info!(%mode, today = self.record.today, total = self.record.total, ?outcome, "session complete");
        self.push(Event::SessionCompleted {
            mode,
            at: self.clock.now(),
        });

        self.reset();
    }

    /// Compensate for ticks missed while the view was inactive.
    pub fn on_visibility_change(&mut self, hidden: bool) {
        if hidden {
            if self.state.running {
                self.state.hidden_at = Some(self.clock.now());
            }
            return;
        }
        if !self.state.running {
            return;
        }
        let Some(hidden_at) = self.state.hidden_at.take() else {
            return;
        };
        let elapsed = (self.clock.now() - hidden_at).num_seconds().max(0) as u64;
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(elapsed);
        debug!(elapsed, remaining = self.state.remaining_secs, "caught up after hidden view");
        self.emit_display();
        if self.state.remaining_secs == 0 {
            self.complete();
        }
    }

    /// Ask for notification permission on the user's first interaction.
    pub fn on_first_interaction(&mut self) {
        if self.first_interaction_seen {
            return;
        }
        self.first_interaction_seen = true;
        self.notifier.request_permission_if_undetermined();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Stop counting without touching the toggle label.
    fn halt(&mut self) {
        self.state.running = false;
        self.state.hidden_at = None;
        if let Some(handle) = self.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    fn emit_display(&mut self) {
        let readout = self.readout();
        self.push(Event::DisplayUpdated {
            readout,
            text: readout.text(),
            title: readout.title(),
        });
        self.emit_progress();
    }

    fn emit_progress(&mut self) {
        let fraction = self.progress();
        self.push(Event::ProgressUpdated {
            fraction,
            dash_offset: self.ring.dash_offset(fraction),
        });
    }

    fn emit_controls(&mut self) {
        self.push(Event::ControlsUpdated {
            toggle: self.toggle,
            modes_enabled: self.modes_enabled(),
            active_mode: self.state.mode,
        });
    }

    fn emit_stats(&mut self) {
        self.push(Event::StatsUpdated {
            today: self.record.today,
            total: self.record.total,
        });
    }

    fn emit_all(&mut self) {
        self.push(Event::ThemeChanged {
            mode: self.state.mode,
            theme: self.state.mode.theme(),
        });
        self.emit_controls();
        self.emit_display();
        self.emit_stats();
    }
}

impl TimerController<TaskQueue> {
    /// Dispatch every task due at `now`. Returns how many ran.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.dispatch(task);
            ran += 1;
        }
        ran
    }
}
