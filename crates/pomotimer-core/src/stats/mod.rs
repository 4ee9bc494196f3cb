//! Completed-session counters.
//!
//! Three string keys in a [`KvStore`]: the calendar day the counters were
//! last touched, the count for that day, and the all-time count. The daily
//! count is zeroed whenever the stored day is not today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::storage::KvStore;

pub const DATE_KEY: &str = "date";
pub const TODAY_KEY: &str = "today";
pub const TOTAL_KEY: &str = "total";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub date: NaiveDate,
    pub today: u64,
    pub total: u64,
}

impl StatsRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            today: 0,
            total: 0,
        }
    }
}

pub struct StatsTracker {
    store: Box<dyn KvStore>,
}

impl StatsTracker {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the counters, rolling the daily count over if `today` is a new day.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn load(&mut self, today: NaiveDate) -> Result<StatsRecord> {
        self.roll_over(today)?;
        Ok(StatsRecord {
            date: today,
            today: self.counter(TODAY_KEY)?,
            total: self.counter(TOTAL_KEY)?,
        })
    }

    /// Count one finished work session.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn increment_on_completion(&mut self, today: NaiveDate) -> Result<StatsRecord> {
        let current = self.load(today)?;
        let updated = StatsRecord {
            date: today,
            today: current.today.saturating_add(1),
            total: current.total.saturating_add(1),
        };
        self.store.set(TODAY_KEY, &updated.today.to_string())?;
        self.store.set(TOTAL_KEY, &updated.total.to_string())?;
        Ok(updated)
    }

    fn roll_over(&mut self, today: NaiveDate) -> Result<()> {
        let today_str = today.format(DATE_FORMAT).to_string();
        let stored = self.store.get(DATE_KEY)?;
        if stored.as_deref() != Some(today_str.as_str()) {
            debug!(previous = ?stored, today = %today_str, "new day, resetting daily count");
            self.store.set(DATE_KEY, &today_str)?;
            self.store.set(TODAY_KEY, "0")?;
        }
        Ok(())
    }

    /// Malformed values read as zero.
    fn counter(&self, key: &str) -> Result<u64> {
        Ok(self.store.get_or(key, "0")?.trim().parse().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn fresh_store_loads_zeroes_and_stamps_date() {
        let store = MemoryStore::new();
        let mut stats = StatsTracker::new(Box::new(store.clone()));
        assert_eq!(stats.load(day(15)).unwrap(), StatsRecord::empty(day(15)));
        assert_eq!(store.get(DATE_KEY).unwrap().as_deref(), Some("2026-10-15"));
    }

    #[test]
    fn increment_bumps_both_counts() {
        let store = MemoryStore::with_entries([
            (DATE_KEY, "2026-10-15"),
            (TODAY_KEY, "2"),
            (TOTAL_KEY, "10"),
        ]);
        let mut stats = StatsTracker::new(Box::new(store.clone()));
        let rec = stats.increment_on_completion(day(15)).unwrap();
        assert_eq!((rec.today, rec.total), (3, 11));
        assert_eq!(store.get(TODAY_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(store.get(TOTAL_KEY).unwrap().as_deref(), Some("11"));
    }

    #[test]
    fn new_day_zeroes_today_and_keeps_total() {
        let store = MemoryStore::with_entries([
            (DATE_KEY, "2026-10-14"),
            (TODAY_KEY, "6"),
            (TOTAL_KEY, "40"),
        ]);
        let mut stats = StatsTracker::new(Box::new(store.clone()));
        let rec = stats.load(day(15)).unwrap();
        assert_eq!((rec.today, rec.total), (0, 40));
        assert_eq!(store.get(DATE_KEY).unwrap().as_deref(), Some("2026-10-15"));
    }

    #[test]
    fn completion_after_midnight_counts_for_the_new_day() {
        let store = MemoryStore::with_entries([
            (DATE_KEY, "2026-10-14"),
            (TODAY_KEY, "6"),
            (TOTAL_KEY, "40"),
        ]);
        let mut stats = StatsTracker::new(Box::new(store));
        let rec = stats.increment_on_completion(day(15)).unwrap();
        assert_eq!((rec.today, rec.total), (1, 41));
    }

    #[test]
    fn malformed_counters_read_as_zero() {
        let store = MemoryStore::with_entries([
            (DATE_KEY, "2026-10-15"),
            (TODAY_KEY, "lots"),
            (TOTAL_KEY, "-3"),
        ]);
        let mut stats = StatsTracker::new(Box::new(store));
        let rec = stats.load(day(15)).unwrap();
        assert_eq!((rec.today, rec.total), (0, 0));
        let rec = stats.increment_on_completion(day(15)).unwrap();
        assert_eq!((rec.today, rec.total), (1, 1));
    }
}
