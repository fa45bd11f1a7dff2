//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file or flag is invalid
    #[error("{0}")]
    Config(String),

    /// Document text given on the command line is not JSON
    #[error("invalid JSON input: {0}")]
    Input(#[source] serde_json::Error),

    /// stdout/stderr failure or output encoding failure
    #[error("{0}")]
    Io(String),

    /// Storage engine error, passed through untouched
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Config(_) => "JSONDB_CLI_CONFIG_ERROR",
            Self::Input(_) => "JSONDB_CLI_INPUT_ERROR",
            Self::Io(_) => "JSONDB_CLI_IO_ERROR",
            Self::Storage(e) => e.code().code(),
        }
    }

    /// Message without the code prefix
    pub fn message(&self) -> String {
        match self {
            Self::Storage(e) => match e.details() {
                Some(details) => format!("{} ({})", e.message(), details),
                None => e.message().to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
