//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Session durations per mode
//! - Sound and notification preferences, including the remembered
//!   notification permission
//! - Display locale and progress-ring radius
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::notify::{Locale, Permission};
use crate::timer::display::DEFAULT_RING_RADIUS;
use crate::timer::Mode;

/// Session durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u64,
    #[serde(default = "default_short_break")]
    pub short_break: u64,
    #[serde(default = "default_long_break")]
    pub long_break: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// System notifications on completion.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Completion chime.
    #[serde(default = "default_true")]
    pub sound: bool,
    /// Answer to the last permission prompt.
    #[serde(default)]
    pub permission: Permission,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_progress_radius")]
    pub progress_radius: f64,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_focus_duration() -> u64 {
    Mode::Work.default_minutes()
}
fn default_short_break() -> u64 {
    Mode::ShortBreak.default_minutes()
}
fn default_long_break() -> u64 {
    Mode::LongBreak.default_minutes()
}
fn default_true() -> bool {
    true
}
fn default_progress_radius() -> f64 {
    DEFAULT_RING_RADIUS
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            permission: Permission::Default,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            progress_radius: default_progress_radius(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        value
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds out-of-range values, or if the default config cannot be
    /// written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Duration configured for a mode, in minutes.
    pub fn minutes_for(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => self.schedule.focus_duration,
            Mode::ShortBreak => self.schedule.short_break,
            Mode::LongBreak => self.schedule.long_break,
        }
    }

    fn validate(&self) -> Result<()> {
        for mode in Mode::ALL {
            if self.minutes_for(mode) == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("schedule ({mode})"),
                    message: "duration must be at least one minute".into(),
                }
                .into());
            }
        }
        if self.ui.progress_radius.is_nan() || self.ui.progress_radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "ui.progress_radius".into(),
                message: "radius must be positive".into(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.focus_duration, 25);
        assert_eq!(parsed.notifications.permission, Permission::Default);
        assert_eq!(parsed.ui.locale, Locale::En);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[schedule]\nshort_break = 3\n").unwrap();
        assert_eq!(parsed.schedule.short_break, 3);
        assert_eq!(parsed.schedule.long_break, 15);
        assert!(parsed.notifications.sound);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.focus_duration").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.permission").as_deref(), Some("default"));
        assert_eq!(cfg.get("ui.locale").as_deref(), Some("en"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_fields() {
        let mut cfg = Config::default();
        cfg.set_value("notifications.sound", "false").unwrap();
        cfg.set_value("schedule.long_break", "20").unwrap();
        cfg.set_value("ui.locale", "ko").unwrap();
        cfg.set_value("ui.progress_radius", "45.5").unwrap();
        assert!(!cfg.notifications.sound);
        assert_eq!(cfg.minutes_for(Mode::LongBreak), 20);
        assert_eq!(cfg.ui.locale, Locale::Ko);
        assert_eq!(cfg.ui.progress_radius, 45.5);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("ui.nonexistent_key", "value").is_err());
        assert!(cfg.set_value("", "value").is_err());
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("notifications.enabled", "not_a_bool").is_err());
        assert!(cfg.set_value("ui.locale", "fr").is_err());
    }

    #[test]
    fn set_value_rejects_zero_duration() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("schedule.focus_duration", "0").is_err());
        assert_eq!(cfg.schedule.focus_duration, 25);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.minutes_for(Mode::Work), 25);
        assert!(path.exists());
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schedule = 12").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn load_from_rejects_hand_edited_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schedule]\nfocus_duration = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("at least one minute"));
    }

    #[test]
    fn load_from_rejects_negative_radius() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\nprogress_radius = -5.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
