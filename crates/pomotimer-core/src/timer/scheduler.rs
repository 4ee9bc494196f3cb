//! Cancelable task scheduling for the controller.
//!
//! The controller never sleeps. It asks a [`Scheduler`] for handles and the
//! host fires due tasks back into it. [`TaskQueue`] is a deadline queue the
//! host polls; it works the same under a tokio loop and in tests that move
//! time by hand.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Work the controller asks to have run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// One-second countdown step.
    Tick,
    /// Turn off the completion pulse.
    ClearCompletionPulse,
    /// Turn off the stats bump animation.
    ClearStatsBump,
}

/// Opaque handle identifying a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

pub trait Scheduler {
    /// Run `task` every `period`, starting one period from now.
    fn schedule_every(&mut self, period: Duration, task: Task) -> TaskHandle;

    /// Run `task` once after `delay`.
    fn schedule_once(&mut self, delay: Duration, task: Task) -> TaskHandle;

    /// Drop a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TaskHandle);
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    due: Instant,
    period: Option<Duration>,
}

/// Deadline-ordered task queue driven by the host's notion of "now".
///
/// Periodic tasks that fall several periods behind fire once and then
/// resume on their original phase; missed periods are not replayed.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    now: Instant,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TaskQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Last instant the queue was told about.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the queue's clock forward. Going backwards is ignored.
    pub fn sync(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Pop the earliest task due at or before `now`.
    ///
    /// One-shot tasks are removed; periodic tasks are re-armed.
    pub fn pop_due(&mut self, now: Instant) -> Option<Task> {
        self.sync(now);
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= self.now)
            .min_by_key(|(_, e)| (e.due, e.handle))
            .map(|(i, _)| i)?;

        let task = self.entries[idx].task;
        match self.entries[idx].period {
            Some(period) => {
                let entry = &mut self.entries[idx];
                let mut next = entry.due + period;
                while next <= self.now {
                    next += period;
                }
                entry.due = next;
            }
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(task)
    }

    fn push(&mut self, due: Instant, period: Option<Duration>, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            task,
            due,
            period,
        });
        handle
    }
}

impl Scheduler for TaskQueue {
    fn schedule_every(&mut self, period: Duration, task: Task) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        self.push(self.now + period, Some(period), task)
    }

    fn schedule_once(&mut self, delay: Duration, task: Task) -> TaskHandle {
        self.push(self.now + delay, None, task)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.entries.retain(|e| e.handle != handle);
    }
}
