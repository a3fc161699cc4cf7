//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing surface rejected an operation.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Reading the pixels back failed.
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// Encoding the raster failed.
    #[error("Export failed: {0}")]
    Export(String),
}
