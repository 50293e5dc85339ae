//! All error types for the pdxloc crate.
//!
//! These are returned from all fallible operations (parsing, file pairing,
//! translation dispatch, etc.). Top-level services fold them into an
//! [`Outcome`](crate::types::Outcome) instead of letting them cross the
//! service boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation API error: {0}")]
    Api(String),

    #[error("translation request timed out after {0} seconds")]
    Timeout(u64),
}

impl Error {
    /// Creates a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Creates a new translation API error
    pub fn api_error(message: impl Into<String>) -> Self {
        Error::Api(message.into())
    }
}
