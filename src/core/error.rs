use std::io;
use thiserror::Error;

/// Unified error type for the GChat application
#[derive(Error, Debug)]
pub enum GchatError {
    /// Errors reported by the Gemini API
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Unrecoverable errors (no API key obtainable, etc.)
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl From<reqwest::Error> for GchatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GchatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GchatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            GchatError::Api(format!("API returned error status: {}", err))
        } else {
            GchatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for GchatError {
    fn from(err: serde_json::Error) -> Self {
        GchatError::Serialization(format!("JSON error: {}", err))
    }
}
