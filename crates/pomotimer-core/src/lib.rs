//! # Pomotimer Core Library
//!
//! Core logic for a single pomodoro countdown: work, short-break and
//! long-break modes, completion side effects, and persisted daily/total
//! completion counts. Nothing here knows about a UI toolkit; a front end
//! feeds [`Input`]s in and renders the [`Event`]s that come out.
//!
//! ## Architecture
//!
//! - **Timer Controller**: sequential state machine driven by a
//!   [`Scheduler`] tick and user input
//! - **Stats**: day-rolling completion counters over a [`KvStore`]
//! - **Storage**: SQLite key-value store and TOML configuration
//! - **Notify**: completion chime and permission-gated system notification
//!
//! ## Key Components
//!
//! - [`TimerController`]: countdown state machine
//! - [`TaskQueue`]: host-polled deadline queue implementing [`Scheduler`]
//! - [`StatsTracker`]: persisted counters
//! - [`NotificationEmitter`]: audio and system notification side effects
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, ValidationError};
pub use events::{Event, Input};
pub use notify::{AudioSink, Chime, Locale, NotificationEmitter, Permission, SystemNotifier};
pub use stats::{StatsRecord, StatsTracker};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{
    Clock, Mode, Scheduler, SystemClock, Task, TaskQueue, Theme, TimerController, TimerState,
    ToggleLabel,
};
