//! Error types for the mnemo_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mnemo_core operations
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

    /// Rating outside the accepted 0-5 range
    #[error("Invalid rating {0}: must be between 0 and 5")]
    InvalidRating(u8),

    /// Referenced card does not exist in the collection
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    /// Card store error (present but unreadable store, failed write)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rating was submitted to an already-finished review session
    #[error("Review session already complete")]
    SessionDone,

    /// Generic error
    #[error("{0}")]
    Other(String),
}
