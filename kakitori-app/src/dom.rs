//! Render backend drawing into an HTML `<canvas>` through its 2D context.

use kakitori_core::{Raster, Rgba, Segment};
use kakitori_renderer::{BackendType, RenderBackend, RenderError, RenderResult};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::{AppError, AppResult};

/// 2D-context backend for a canvas element.
#[derive(Debug)]
pub struct DomCanvasBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl DomCanvasBackend {
    /// Look up a canvas element by id and take its 2D context.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing, is not a canvas, or has no
    /// 2D context.
    pub fn from_element_id(document: &Document, canvas_id: &str) -> AppResult<Self> {
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| AppError::Dom(format!("Canvas element '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::Dom("Element is not a canvas".to_string()))?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| AppError::Dom("Failed to get 2D context".to_string()))?
            .ok_or_else(|| AppError::Dom("2D context not available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::Dom("Failed to cast to 2D context".to_string()))?;

        Ok(Self { canvas, ctx })
    }

    /// Page position of the canvas' top-left corner.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn page_offset(&self) -> (f32, f32) {
        let rect = self.canvas.get_bounding_client_rect();
        let (scroll_x, scroll_y) = web_sys::window()
            .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
            .unwrap_or_default();
        ((rect.left() + scroll_x) as f32, (rect.top() + scroll_y) as f32)
    }
}

impl RenderBackend for DomCanvasBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Canvas2D
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn fill(&mut self, color: Rgba) -> RenderResult<()> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        Ok(())
    }

    fn draw_segment(&mut self, segment: &Segment) -> RenderResult<()> {
        let (x0, y0) = segment.from;
        let (x1, y1) = segment.to;
        self.ctx.set_stroke_style_str(&segment.style.color.to_css());
        self.ctx.set_line_join("round");
        self.ctx.set_line_width(f64::from(segment.style.width));
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(x0), f64::from(y0));
        self.ctx.line_to(f64::from(x1), f64::from(y1));
        self.ctx.close_path();
        self.ctx.stroke();
        Ok(())
    }

    fn snapshot(&self) -> RenderResult<Raster> {
        let (width, height) = self.size();
        let image = self
            .ctx
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|e| RenderError::Snapshot(format!("{e:?}")))?;
        Raster::from_rgba(image.width(), image.height(), image.data().0)
            .ok_or_else(|| RenderError::Snapshot("ImageData has the wrong length".to_string()))
    }
}
