//! Rendering backend implementations.

pub mod raster;

use kakitori_core::{Raster, Rgba, Segment};

use crate::{BackendType, RenderResult};

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the drawing area. Contents are undefined afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Paint the whole area with one colour.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn fill(&mut self, color: Rgba) -> RenderResult<()>;

    /// Stroke one segment as a closed path with round joins.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn draw_segment(&mut self, segment: &Segment) -> RenderResult<()>;

    /// Read the pixels back.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixels cannot be read.
    fn snapshot(&self) -> RenderResult<Raster>;
}
