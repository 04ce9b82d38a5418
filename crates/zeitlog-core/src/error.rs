//! Core error types for zeitlog-core.
//!
//! All domain errors are expected, recoverable, caller-facing conditions.
//! Storage failures are kept distinct so callers can tell a rule violation
//! ("timer already running") from an unavailable backend.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for zeitlog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timer is already running; `start` requires the Idle state.
    #[error("a timer is already running")]
    AlreadyRunning,

    /// No timer is running; `stop` requires the Running state.
    #[error("no active timer")]
    NoActiveTimer,

    /// The target entry is running and must be stopped first.
    #[error("entry {0} is currently running")]
    EntryRunning(i64),

    /// A record lookup came up empty.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// An active project with this name already exists.
    #[error("project '{0}' already exists")]
    DuplicateName(String),

    /// End time must be strictly after start time.
    #[error("invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// A date or clock value failed to parse.
    #[error("invalid date/time format: {0}")]
    InvalidFormat(String),

    /// Storage-related errors
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query or transaction failed
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// IO errors while preparing the data directory
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(StorageError::Query(err))
    }
}
