//! Application error types.

use kakitori_core::DrillError;
use kakitori_renderer::RenderError;
use thiserror::Error;

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced to the host page.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session or catalog error.
    #[error(transparent)]
    Drill(#[from] DrillError),

    /// Drawing surface error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The page is missing something the app needs.
    #[error("DOM error: {0}")]
    Dom(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
