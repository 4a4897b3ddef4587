//! Error types for the model layer.

use plinth_schema::ValidationError;
use thiserror::Error;

/// Model-layer errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A record type was misconfigured at build time. Fatal, not
    /// recoverable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A schema violation aborted a save.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No row matched and the caller required one.
    #[error("record not found")]
    NotFound,

    /// The persistence engine failed internally.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
