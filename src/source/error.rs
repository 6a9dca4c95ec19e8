//! Error types for status fetches.

use thiserror::Error;

/// Errors that can occur while fetching a status snapshot.
///
/// This is the only error the view ever displays. It is stored in the
/// status store as its display string and shown inline under each table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The gateway answered with a non-success status code.
    #[error("Gateway returned status {0}")]
    Status(u16),

    /// Connection to the gateway failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the gateway.
    #[error("Request timed out")]
    Timeout,

    /// The payload was not a valid status document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The status file could not be read.
    #[error("Read error: {0}")]
    Read(String),

    /// The fetch task panicked or was cancelled by the runtime.
    #[error("Fetch task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Read(err.to_string())
    }
}
