//! # Kakitori Renderer
//!
//! Turns the stroke log into pixels.
//!
//! ## Rendering Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        CanvasSurface (stroke log)           │
//! ├─────────────────────────────────────────────┤
//! │            RenderBackend trait              │
//! ├──────────────────────┬──────────────────────┤
//! │ RasterBackend (CPU)  │ DOM 2D context       │
//! │ native, tests, CLI   │ (kakitori-app)       │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
#[cfg(feature = "images")]
pub mod export;
pub mod surface;

pub use backend::raster::RasterBackend;
pub use backend::RenderBackend;
pub use error::{RenderError, RenderResult};
pub use surface::CanvasSurface;

use kakitori_core::Rgba;

/// Configuration for a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Paper colour, also the eraser colour.
    pub background: Rgba,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 200,
            background: Rgba::WHITE,
        }
    }
}

/// Available rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory RGBA buffer.
    Raster,
    /// Browser `CanvasRenderingContext2d`.
    Canvas2D,
}
