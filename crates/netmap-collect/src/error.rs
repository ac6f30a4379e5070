//! Error types for the collect crate.

use thiserror::Error;

/// Errors that can occur while talking to controllers or writing output.
#[derive(Debug, Error)]
pub enum CollectError {
    /// I/O error writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode or decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Every login path was rejected by the controller.
    #[error("Login to {url} failed with HTTP {status}")]
    LoginFailed {
        /// Controller base URL.
        url: String,
        /// Status of the last attempt.
        status: u16,
    },

    /// A request was made before a successful login.
    #[error("Not logged in to {0}")]
    NotLoggedIn(String),

    /// An endpoint answered with a non-success status.
    #[error("{endpoint} responded with HTTP {status}")]
    UnexpectedStatus {
        /// Requested endpoint.
        endpoint: String,
        /// Response status.
        status: u16,
    },
}
