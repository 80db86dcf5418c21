//! Error types for quorum-mutate

use thiserror::Error;

/// Result type alias for quorum-mutate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quorum-mutate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from quorum-core (cache encode/decode and friends)
    #[error("Core error: {0}")]
    Core(#[from] quorum_core::Error),

    /// The server or transport rejected the write. The cache has
    /// already been rolled back when this is returned.
    #[error("Write rejected for '{scope}': {message}")]
    Rejected { scope: String, message: String },
}

impl Error {
    /// Create a rejection error for the given entity scope.
    pub fn rejected(scope: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Rejected {
            scope: scope.into(),
            message: message.to_string(),
        }
    }
}
