//! Error types for drill operations.

use thiserror::Error;

use crate::recognizer::RecognizerError;

/// Result type for drill operations.
pub type DrillResult<T> = Result<T, DrillError>;

/// Errors that can occur while drilling questions.
#[derive(Debug, Error)]
pub enum DrillError {
    /// The drawing surface or the recognizer has not been initialised yet.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// A recognition is already in flight for the current question.
    #[error("A recognition is already in progress")]
    Busy,

    /// A recognition result arrived for a question that is no longer current.
    #[error("Stale recognition result (ticket {0})")]
    StaleResult(u64),

    /// No recognition is outstanding.
    #[error("No recognition in progress")]
    NotChecking,

    /// Tool name did not match any known tool.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Catalog content is unusable.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Catalog or stroke log (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The recognizer reported a failure.
    #[error("Recognition failed: {0}")]
    Recognizer(#[from] RecognizerError),
}
