//! Error types for gh-avatar-browser
//!
//! The hierarchy mirrors the three ways the screen can fail:
//! - [`FetchError`] when the user list cannot be loaded (fatal for that load)
//! - [`Error::PermissionDenied`] when the storage capability is refused
//! - [`DownloadError`] when a single avatar download fails (isolated to one row)

use crate::types::UserId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gh-avatar-browser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gh-avatar-browser
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "per_page")
        key: Option<String>,
    },

    /// Loading the user list failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A single avatar download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// The platform refused the storage-write capability
    #[error("permission denied: media permissions are required to download images")]
    PermissionDenied,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not available in this screen variant
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Screen is unmounting - not accepting new work
    #[error("screen is unmounting: not accepting new work")]
    ShuttingDown,
}

impl Error {
    /// Message shown to the user in the error view
    ///
    /// Fetch errors drop the `fetch error:` prefix so the view reads
    /// `Error: <what went wrong>`.
    pub fn user_message(&self) -> String {
        match self {
            Error::Fetch(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Errors raised while loading the user list
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, TLS)
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("request failed with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Payload did not match the expected `{ "items": [...] }` shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors raised by a single avatar download
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The row id is not part of the populated list
    #[error("user {id} is not in the current list")]
    UnknownUser {
        /// The row id that was requested
        id: UserId,
    },

    /// A download for this row is already running
    #[error("download for {login} is already in progress")]
    AlreadyInFlight {
        /// Login of the row that is already downloading
        login: String,
    },

    /// Avatar request failed at the transport level
    #[error("failed to fetch avatar for {login}: {source}")]
    Network {
        /// Login of the affected user
        login: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Avatar endpoint answered with a non-success status
    #[error("avatar request for {login} failed with status {status}")]
    Status {
        /// Login of the affected user
        login: String,
        /// HTTP status code
        status: u16,
    },

    /// Encoded payload could not be decoded by the storage layer
    #[error("invalid encoded payload for {login}: {reason}")]
    Encoding {
        /// Login of the affected user
        login: String,
        /// Decoder message
        reason: String,
    },

    /// Writing or renaming the output file failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The task was cancelled because the screen unmounted
    #[error("download for {login} was cancelled")]
    Cancelled {
        /// Login of the affected user
        login: String,
    },
}
