//! Error types for the suggestions service.

use thiserror::Error;

/// Result type alias using the service's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for suggestion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Word suggestion not found
    #[error("Word suggestion not found: {0}")]
    WordSuggestionNotFound(uuid::Uuid),

    /// Example suggestion not found
    #[error("Example suggestion not found: {0}")]
    ExampleSuggestionNotFound(uuid::Uuid),

    /// Invalid input (malformed body, bad id, bad query parameter)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request conflicts with the current state of a record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::WordSuggestionNotFound(_)
                | Error::ExampleSuggestionNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
