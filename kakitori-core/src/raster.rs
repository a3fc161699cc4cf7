//! Raster snapshots of the drawing surface.

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque white, the paper colour.
    pub const WHITE: Self = Self([0xFF, 0xFF, 0xFF, 0xFF]);
    /// Opaque black.
    pub const BLACK: Self = Self([0x00, 0x00, 0x00, 0xFF]);
    /// Graphite grey used by the pencil (`#474A51`).
    pub const GRAPHITE: Self = Self([0x47, 0x4A, 0x51, 0xFF]);

    /// Build an opaque colour from its components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 0xFF])
    }

    /// CSS hex form (`#rrggbb`), as understood by a 2D canvas context.
    #[must_use]
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

/// A snapshot of the surface pixels, RGBA row-major with 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a raster filled with a single colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let len = pixel_count(width, height);
        let mut pixels = Vec::with_capacity(len * 4);
        for _ in 0..len {
            pixels.extend_from_slice(&color.0);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap existing RGBA bytes.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != pixel_count(width, height) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the raster and return its RGBA bytes.
    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    /// Colour at a pixel, `None` outside the raster.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(Rgba(px))
    }

    /// Overwrite a pixel. Writes outside the raster are dropped.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 4].copy_from_slice(&color.0);
        }
    }

    /// Paint every pixel with one colour.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
    }

    /// Number of pixels that differ from `color`.
    #[must_use]
    pub fn count_not(&self, color: Rgba) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| *px != color.0)
            .count()
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
