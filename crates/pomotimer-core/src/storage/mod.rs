mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, ScheduleConfig, UiConfig};
pub use database::Database;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{ConfigError, Result};

/// String-valued key-value store that survives restarts.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Value for `key`, or `default` when the key is absent.
    fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store
            .map
            .borrow_mut()
            .extend(entries.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        store
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTIMER_HOME` overrides the location outright. Otherwise it is
/// `~/.config/pomotimer/`, or `~/.config/pomotimer-dev/` when
/// `POMOTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOTIMER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotimer-dev")
            } else {
                base_dir.join("pomotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_or_falls_back() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_or("today", "0").unwrap(), "0");
        store.set("today", "3").unwrap();
        assert_eq!(store.get_or("today", "0").unwrap(), "3");
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::with_entries([("total", "7")]);
        let mut writer = store.clone();
        writer.set("total", "8").unwrap();
        assert_eq!(store.get("total").unwrap().as_deref(), Some("8"));
    }
}
