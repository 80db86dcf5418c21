//! Error types for quorum-core

use thiserror::Error;

/// Result type alias for quorum-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quorum-core and downstream Quorum crates
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A cached value could not be decoded into the expected type
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value could not be encoded for caching or transport
    #[error("Encode error: {0}")]
    Encode(String),

    /// A required cache entry was absent
    #[error("Missing cache entry: {0}")]
    MissingEntry(String),

    /// A general operation failure
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create a decode error from any displayable cause.
    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Self::Decode(cause.to_string())
    }

    /// Create an encode error from any displayable cause.
    pub fn encode(cause: impl std::fmt::Display) -> Self {
        Self::Encode(cause.to_string())
    }

    /// Create a missing-entry error naming the absent key.
    pub fn missing_entry(key: impl std::fmt::Display) -> Self {
        Self::MissingEntry(key.to_string())
    }

    /// Create a general operation error.
    pub fn operation(cause: impl std::fmt::Display) -> Self {
        Self::Operation(cause.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
