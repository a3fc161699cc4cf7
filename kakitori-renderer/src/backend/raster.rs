//! CPU backend drawing into an in-memory RGBA buffer.
//!
//! Segments are rasterised without anti-aliasing: a pixel is painted when its
//! centre lies within half the line width of the segment. That is the shape a
//! closed two-point path stroked with round joins produces, and it keeps the
//! output bit-exact across runs.

use kakitori_core::{Raster, Rgba, Segment};

use crate::{BackendType, RenderResult};

use super::RenderBackend;

/// In-memory raster backend.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    raster: Raster,
}

impl RasterBackend {
    /// Create a backend of the given size, initially transparent black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::filled(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    /// Borrow the pixels without copying.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl RenderBackend for RasterBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Raster
    }

    fn size(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.raster = Raster::filled(width, height, Rgba([0, 0, 0, 0]));
        tracing::debug!("Raster backend resized to {}x{}", width, height);
        Ok(())
    }

    fn fill(&mut self, color: Rgba) -> RenderResult<()> {
        self.raster.fill(color);
        Ok(())
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn draw_segment(&mut self, segment: &Segment) -> RenderResult<()> {
        let radius = segment.style.width / 2.0;
        let (x0, y0) = segment.from;
        let (x1, y1) = segment.to;

        let min_x = (x0.min(x1) - radius).floor().max(0.0);
        let min_y = (y0.min(y1) - radius).floor().max(0.0);
        let max_x = (x0.max(x1) + radius).ceil().min(self.raster.width() as f32);
        let max_y = (y0.max(y1) + radius).ceil().min(self.raster.height() as f32);
        if min_x >= max_x || min_y >= max_y {
            return Ok(());
        }

        for py in min_y as u32..max_y as u32 {
            for px in min_x as u32..max_x as u32 {
                let cx = px as f32 + 0.5;
                let cy = py as f32 + 0.5;
                if distance_to_segment((cx, cy), segment.from, segment.to) <= radius {
                    self.raster.put_pixel(px, py, segment.style.color);
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> RenderResult<Raster> {
        Ok(self.raster.clone())
    }
}

/// Euclidean distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakitori_core::StrokeStyle;

    fn segment(from: (f32, f32), to: (f32, f32), width: f32) -> Segment {
        Segment {
            from,
            to,
            style: StrokeStyle {
                color: Rgba::BLACK,
                width,
            },
        }
    }

    #[test]
    fn distance_to_segment_cases() {
        assert!((distance_to_segment((0.0, 1.0), (0.0, 0.0), (2.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((distance_to_segment((3.0, 0.0), (0.0, 0.0), (2.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((distance_to_segment((1.0, 1.0), (1.0, 0.0), (1.0, 0.0)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn horizontal_segment_paints_a_band() {
        let mut backend = RasterBackend::new(20, 10);
        backend.fill(Rgba::WHITE).unwrap();
        backend
            .draw_segment(&segment((2.0, 5.0), (12.0, 5.0), 3.0))
            .unwrap();

        let raster = backend.snapshot().unwrap();
        assert_eq!(raster.pixel(7, 5), Some(Rgba::BLACK));
        assert_eq!(raster.pixel(7, 4), Some(Rgba::BLACK));
        assert_eq!(raster.pixel(7, 2), Some(Rgba::WHITE));
        assert_eq!(raster.pixel(18, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn thin_stub_paints_at_least_one_pixel() {
        let mut backend = RasterBackend::new(10, 10);
        backend.fill(Rgba::WHITE).unwrap();
        backend
            .draw_segment(&segment((4.0, 5.0), (5.0, 5.0), 1.01))
            .unwrap();
        assert!(backend.raster().count_not(Rgba::WHITE) >= 1);
    }

    #[test]
    fn segment_outside_is_clipped() {
        let mut backend = RasterBackend::new(10, 10);
        backend.fill(Rgba::WHITE).unwrap();
        backend
            .draw_segment(&segment((-50.0, -50.0), (-40.0, -40.0), 5.0))
            .unwrap();
        backend
            .draw_segment(&segment((9.0, 9.0), (30.0, 9.0), 5.0))
            .unwrap();
        assert_eq!(backend.raster().pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(backend.raster().pixel(9, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn resize_changes_size() {
        let mut backend = RasterBackend::new(10, 10);
        backend.resize(30, 12).unwrap();
        assert_eq!(backend.size(), (30, 12));
        assert_eq!(backend.snapshot().unwrap().as_rgba().len(), 30 * 12 * 4);
    }
}
