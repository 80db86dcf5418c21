//! Error types for quorum-client

use thiserror::Error;

/// Result type alias for quorum-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quorum-client
///
/// The mutation protocol does not branch on the distinction between
/// transport and server rejection — both take the rollback path — but
/// the variants are kept separate for logging fidelity.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from quorum-core
    #[error("Core error: {0}")]
    Core(#[from] quorum_core::Error),

    /// A mutation rejected by the engine (already rolled back)
    #[error("Mutation error: {0}")]
    Mutation(#[from] quorum_mutate::Error),

    /// HTTP transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the server
    #[error("Server rejected request with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a status error from a response code and body.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(cause: impl std::fmt::Display) -> Self {
        Self::Config(cause.to_string())
    }
}
