//! Typed errors for the store, remote client and configuration.
//!
//! Per-line and per-file problems never reach these types: they are logged and
//! skipped where they occur. Only directory-level, network-level and configuration
//! failures propagate to the CLI, which reports them and exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the local conversation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The log root directory does not exist
    #[error("Claude directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The log root exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the remote upload/delete API
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No response was received (connection refused, timeout)
    #[error("No response from server. Is the server running?")]
    Unreachable {
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Delete of a record uploaded by another client
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Delete of an unknown record
    #[error("Conversation not found")]
    NotFound,

    /// Any other transport failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A success response whose body is not the expected JSON
    #[error("Invalid server response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("HOME environment variable not set")]
    HomeNotSet,

    /// The log root holding the client id does not exist
    #[error("Claude directory not found: {}", path.display())]
    ClaudeDirMissing { path: PathBuf },

    #[error("Failed to {action} client id file {}: {source}", path.display())]
    ClientId {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
