//! Error types for the cet compile/watch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a compile cycle, the watcher, or configuration loading
#[derive(Debug, Error)]
pub enum CetError {
    #[error("file {0} does not exist")]
    SourceNotFound(PathBuf),

    #[error("failed to read file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Collect(String),

    #[error("failed to send request: {0}")]
    RequestFailed(String),

    #[error("server returned {status}: {preview}")]
    HttpStatus { status: u16, preview: String },

    #[error("failed to parse response: {message}\nBody: {preview}")]
    InvalidResponse { message: String, preview: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watcher error: {0}")]
    WatchError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for CetError {
    fn from(err: config::ConfigError) -> Self {
        CetError::ConfigError(err.to_string())
    }
}

impl From<notify::Error> for CetError {
    fn from(err: notify::Error) -> Self {
        CetError::WatchError(err.to_string())
    }
}
