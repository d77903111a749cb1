//! Common error types for the guild directory service

use thiserror::Error;

/// Common result type for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy across the directory service
#[derive(Error, Debug)]
pub enum Error {
    /// Both the local override and the remote content source failed.
    /// Fatal to the reconciliation cycle; the prior snapshot is retained.
    #[error("no directory source available (local: {local}; remote: {remote})")]
    SourceUnavailable { local: String, remote: String },

    /// Directory text did not match the expected nested structure
    #[error("malformed directory content: {0}")]
    MalformedContent(String),

    /// A reconciliation cycle is already in flight; the request was rejected
    #[error("a directory reconciliation is already in progress")]
    ReconciliationInProgress,

    /// HTTP transport error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
