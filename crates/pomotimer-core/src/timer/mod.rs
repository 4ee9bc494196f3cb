mod clock;
mod controller;
pub mod display;
mod mode;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    TimerController, TimerState, ToggleLabel, COMPLETION_PULSE, STATS_BUMP, TICK_PERIOD,
};
pub use display::{progress_fraction, ProgressRing, Readout};
pub use mode::{Mode, Theme};
pub use scheduler::{Scheduler, Task, TaskHandle, TaskQueue};
