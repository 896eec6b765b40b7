//! Error types for the footprint_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for footprint_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submitted value was rejected; nothing was recorded
    #[error("Invalid input for {field}: {value:?} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Session identifier is not usable as a record key
    #[error("Invalid session id: {0:?}")]
    InvalidSession(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// News lookup failed (always recovered before reaching callers of the engine)
    #[error("News error: {0}")]
    News(#[from] NewsError),
}

/// Failure modes of the external headline lookup
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    /// No API key configured
    #[error("no news API key configured")]
    MissingCredential,

    /// Connection, TLS or timeout failure
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("server returned {0}")]
    Status(u16),

    /// Response body was not the expected shape
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => NewsError::Status(status.as_u16()),
            None => NewsError::Transport(err.to_string()),
        }
    }
}
