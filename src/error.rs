//! Error types for the Subsonic adapter.

use thiserror::Error;

/// Errors raised while talking to a Subsonic-compatible server.
///
/// None of these reach the host directly: every host-facing operation logs the
/// error and answers with its empty shape instead.
#[derive(Error, Debug)]
pub enum SonicError {
    /// One of address, username or password is missing
    #[error("Server address, username and password are all required")]
    IncompleteConfig,

    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus { status: u16, endpoint: String },

    /// Response body was not JSON
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// JSON was valid but not a `subsonic-response` envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Envelope carried `status: failed`
    #[error("Server error ({code}): {message}")]
    ServerFailure { code: i64, message: String },

    /// Neither authentication scheme was accepted
    #[error("Could not negotiate a session with {address}")]
    NegotiationFailed { address: String },

    /// Address could not be turned into a request URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, SonicError>;
