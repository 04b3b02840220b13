//! Core error types for finishline-core.
//!
//! Malformed session events and corrupt log lines are not errors: the
//! normalizer and the reader absorb them. What remains is I/O against the
//! session log and the configuration file.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for finishline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session log errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Session log errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Creating the directory, the file or its header failed
    #[error("Failed to initialize session log at {path}: {source}")]
    InitFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Appending a record line failed
    #[error("Failed to append to session log at {path}: {source}")]
    AppendFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the log back failed
    #[error("Failed to read session log at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A writer panicked while holding the log lock
    #[error("Session log lock poisoned")]
    Poisoned,

    /// No home directory and no override
    #[error("Cannot determine data directory")]
    DataDirUnavailable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
