//! Core error types for pomotimer-core.
//!
//! The countdown itself never fails. Errors only come from the edges:
//! the persisted key-value store, the configuration file, and the
//! notification backends (which callers are expected to swallow).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Audio or system notification failures
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Data directory unavailable at {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Unrecognised mode tag
    #[error("Unknown mode '{0}' (expected work, short-break or long-break)")]
    UnknownMode(String),
}

/// Failures of the side-effect emitters.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No audio output is available
    #[error("Audio output unavailable: {0}")]
    AudioUnavailable(String),

    /// System notifications are unsupported on this host
    #[error("System notifications unsupported")]
    Unsupported,

    /// The backend accepted the request but failed to deliver it
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rusqlite_errors_become_query_failures() {
        let err: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::QueryFailed(_))
        ));
    }

    #[test]
    fn unknown_mode_message_lists_choices() {
        let err = ValidationError::UnknownMode("nap".into());
        assert!(err.to_string().contains("short-break"));
    }
}
