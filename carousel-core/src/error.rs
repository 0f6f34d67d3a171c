//! Error types for editor operations.
//!
//! Discovery misses, unavailable geometry and protected media are not errors:
//! those paths return plain outcomes and log. Only misuse of the editor API
//! and I/O surface here.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The slide index does not exist in the deck.
    #[error("Slide not found: {0}")]
    SlideNotFound(usize),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while exporting or loading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
