//! Error types for the form engine and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Misuse of a form: these never come from validators or submit handlers,
/// whose failures are recorded as form state instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' configured twice")]
    DuplicateField(String),

    #[error("A submission is already in progress")]
    SubmitInProgress,
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config validation failed: {message}")]
    Invalid { message: String },
}
