//! The drawing surface: pointer input in, rasters out.
//!
//! [`CanvasSurface`] owns the stroke log, the active tool and the pen state.
//! It paints through whatever [`RenderBackend`] is attached. Until a backend
//! is attached the surface is not ready and every drawing operation is a
//! no-op, mirroring a canvas element that has not been mounted yet.
//!
//! Attaching a backend, every point append and every clear end with the
//! current pixels queued as a [`SurfaceEvent`] for the host to forward to the
//! session. The log is the only source of the image: anything that wipes the
//! pixels without deleting points replays the log straight away.

use kakitori_core::{
    PointerEvent, PointerPhase, Raster, StrokeLog, StrokePoint, SurfaceCommand, SurfaceEvent,
    ToolKind,
};

use crate::{RenderBackend, RenderResult, SurfaceConfig};

/// Stroke capture and redraw over a pluggable backend.
#[derive(Debug)]
pub struct CanvasSurface<B> {
    backend: Option<B>,
    config: SurfaceConfig,
    log: StrokeLog,
    tool: ToolKind,
    pen_down: bool,
    offset: (f32, f32),
    events: Vec<SurfaceEvent>,
}

impl<B: RenderBackend> CanvasSurface<B> {
    /// Create a surface with no backend attached.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            backend: None,
            config,
            log: StrokeLog::new(),
            tool: ToolKind::default(),
            pen_down: false,
            offset: (0.0, 0.0),
            events: Vec::new(),
        }
    }

    /// Create a surface that is ready immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be prepared.
    pub fn with_backend(config: SurfaceConfig, backend: B) -> RenderResult<Self> {
        let mut surface = Self::new(config);
        surface.attach(backend)?;
        Ok(surface)
    }

    /// Attach a backend, size it and replay the log into it.
    ///
    /// The initial raster is queued, so a freshly mounted surface already has
    /// an image to check.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the resize or redraw.
    pub fn attach(&mut self, mut backend: B) -> RenderResult<()> {
        if backend.size() != (self.config.width, self.config.height) {
            backend.resize(self.config.width, self.config.height)?;
        }
        tracing::info!(
            "Surface attached to {:?} backend ({}x{})",
            backend.backend_type(),
            self.config.width,
            self.config.height
        );
        self.backend = Some(backend);
        self.redraw()
    }

    /// Detach and return the backend. The stroke log is kept.
    pub fn detach(&mut self) -> Option<B> {
        self.pen_down = false;
        self.backend.take()
    }

    /// Whether a backend is attached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// The attached backend, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Surface configuration.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// The recorded stroke points.
    #[must_use]
    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    /// The active tool.
    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Whether the pen is currently down.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.pen_down
    }

    /// Page position of the surface's top-left corner.
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    /// Record where the surface sits on the page. Call again whenever the
    /// viewport changes.
    pub fn set_offset(&mut self, left: f32, top: f32) {
        self.offset = (left, top);
        tracing::debug!("Surface offset set to ({}, {})", left, top);
    }

    /// Switch the active tool. Takes effect for the next recorded point.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if tool != self.tool {
            tracing::debug!("Tool changed: {} -> {}", self.tool, tool);
        }
        self.tool = tool;
    }

    /// Pen down at surface-local coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn begin_stroke(&mut self, x: f32, y: f32) -> RenderResult<()> {
        if !self.is_ready() {
            return Ok(());
        }
        self.pen_down = true;
        self.append(StrokePoint::new(x, y, false, self.tool))
    }

    /// Pointer moved to surface-local coordinates. Ignored while the pen is
    /// up.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn continue_stroke(&mut self, x: f32, y: f32) -> RenderResult<()> {
        if !self.is_ready() || !self.pen_down {
            return Ok(());
        }
        self.append(StrokePoint::new(x, y, true, self.tool))
    }

    /// Pen up. Records nothing.
    pub fn end_stroke(&mut self) {
        self.pen_down = false;
    }

    /// Dispatch a page-coordinate pointer event.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> RenderResult<()> {
        let x = event.page_x - self.offset.0;
        let y = event.page_y - self.offset.1;
        match event.phase {
            PointerPhase::Down => self.begin_stroke(x, y),
            PointerPhase::Move => self.continue_stroke(x, y),
            PointerPhase::Up | PointerPhase::Leave => {
                self.end_stroke();
                Ok(())
            }
        }
    }

    /// Repaint the background over everything.
    ///
    /// With `delete_points` the log is emptied too, an active eraser falls
    /// back to the pencil and the blank raster is queued as
    /// [`SurfaceEvent::ClearAcknowledged`]. Without it the log is replayed
    /// over the fresh background, same as [`CanvasSurface::redraw`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to paint or read back.
    pub fn clear(&mut self, delete_points: bool) -> RenderResult<()> {
        if !delete_points {
            return self.redraw();
        }
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        backend.fill(self.config.background)?;
        self.log.clear();
        if self.tool == ToolKind::Eraser {
            self.tool = ToolKind::Pencil;
        }
        let raster = backend.snapshot()?;
        self.events.push(SurfaceEvent::ClearAcknowledged(raster));
        tracing::debug!("Surface cleared");
        Ok(())
    }

    /// Resize the pixel area and replay the log into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to resize or redraw.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.config.width = width;
        self.config.height = height;
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        backend.resize(width, height)?;
        self.redraw()
    }

    /// Replace the stroke log with a saved one and redraw once.
    ///
    /// The pen ends up, so the next move after a load records nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn load(&mut self, log: StrokeLog) -> RenderResult<()> {
        if !self.is_ready() {
            return Ok(());
        }
        tracing::debug!("Loading {} stroke points", log.len());
        self.log = log;
        self.pen_down = false;
        self.redraw()
    }

    /// Apply a command from the session or the host.
    ///
    /// # Errors
    ///
    /// Returns an error if a clear fails.
    pub fn apply(&mut self, command: SurfaceCommand) -> RenderResult<()> {
        match command {
            SurfaceCommand::RequestClear => self.clear(true),
            SurfaceCommand::SetTool(tool) => {
                self.select_tool(tool);
                Ok(())
            }
        }
    }

    /// Replay the whole log and queue the resulting raster.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to draw or read back.
    pub fn redraw(&mut self) -> RenderResult<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        let background = self.config.background;
        backend.fill(background)?;
        for segment in self.log.segments(background) {
            backend.draw_segment(&segment)?;
        }
        let raster = backend.snapshot()?;
        self.events.push(SurfaceEvent::StrokeCommitted(raster));
        Ok(())
    }

    /// Current pixels, if a backend is attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn snapshot(&self) -> RenderResult<Option<Raster>> {
        self.backend.as_ref().map(RenderBackend::snapshot).transpose()
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn append(&mut self, point: StrokePoint) -> RenderResult<()> {
        tracing::trace!(
            "Stroke point ({}, {}) dragging={} tool={}",
            point.x,
            point.y,
            point.is_dragging,
            point.tool
        );
        self.log.push(point);
        self.redraw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RasterBackend;
    use kakitori_core::Rgba;

    fn surface() -> CanvasSurface<RasterBackend> {
        let config = SurfaceConfig {
            width: 40,
            height: 20,
            background: Rgba::WHITE,
        };
        let mut surface =
            CanvasSurface::with_backend(config, RasterBackend::new(40, 20)).unwrap();
        surface.drain_events();
        surface
    }

    #[test]
    fn test_attach_queues_blank_raster() {
        let mut surface = CanvasSurface::with_backend(
            SurfaceConfig {
                width: 40,
                height: 20,
                background: Rgba::WHITE,
            },
            RasterBackend::new(40, 20),
        )
        .unwrap();
        assert!(surface.is_ready());
        let events = surface.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SurfaceEvent::StrokeCommitted(_)));
        assert_eq!(events[0].raster().count_not(Rgba::WHITE), 0);
    }

    #[test]
    fn test_reattach_replays_kept_log() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        let backend = surface.detach().unwrap();
        surface.drain_events();

        surface.attach(backend).unwrap();
        let events = surface.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].raster().count_not(Rgba::WHITE) > 0);
    }

    #[test]
    fn test_not_ready_is_noop() {
        let mut surface: CanvasSurface<RasterBackend> = CanvasSurface::new(SurfaceConfig::default());
        surface.begin_stroke(5.0, 5.0).unwrap();
        surface.continue_stroke(6.0, 6.0).unwrap();
        surface.clear(true).unwrap();
        assert!(!surface.is_ready());
        assert!(surface.log().is_empty());
        assert!(surface.drain_events().is_empty());
        assert!(surface.snapshot().unwrap().is_none());
    }

    #[test]
    fn test_drag_flags() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        surface.continue_stroke(10.0, 5.0).unwrap();
        surface.continue_stroke(15.0, 5.0).unwrap();
        surface.end_stroke();
        surface.continue_stroke(20.0, 5.0).unwrap();

        let flags: Vec<bool> = surface.log().points().iter().map(|p| p.is_dragging).collect();
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(surface.drain_events().len(), 3);
    }

    #[test]
    fn test_every_append_emits_committed_raster() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        let events = surface.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SurfaceEvent::StrokeCommitted(_)));
        assert!(events[0].raster().count_not(Rgba::WHITE) > 0);
    }

    #[test]
    fn test_clear_resets_eraser_only() {
        let mut surface = surface();
        surface.select_tool(ToolKind::Eraser);
        surface.clear(true).unwrap();
        assert_eq!(surface.tool(), ToolKind::Pencil);

        surface.select_tool(ToolKind::Brush);
        surface.clear(true).unwrap();
        assert_eq!(surface.tool(), ToolKind::Brush);
    }

    #[test]
    fn test_clear_without_delete_replays_log() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        surface.continue_stroke(15.0, 5.0).unwrap();
        let drawn = surface.snapshot().unwrap().unwrap();
        surface.drain_events();

        surface.clear(false).unwrap();

        assert_eq!(surface.log().len(), 2);
        let events = surface.drain_events();
        assert_eq!(events, vec![SurfaceEvent::StrokeCommitted(drawn.clone())]);
        assert_eq!(surface.snapshot().unwrap().unwrap(), drawn);
    }

    #[test]
    fn test_resize_replays_log() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        surface.continue_stroke(15.0, 5.0).unwrap();
        surface.drain_events();

        surface.resize(60, 30).unwrap();
        let events = surface.drain_events();
        assert_eq!(events.len(), 1);
        let raster = events[0].raster();
        assert_eq!((raster.width(), raster.height()), (60, 30));
        assert!(raster.count_not(Rgba::WHITE) > 0);
    }

    #[test]
    fn test_apply_commands() {
        let mut surface = surface();
        surface.apply(SurfaceCommand::SetTool(ToolKind::Brush)).unwrap();
        assert_eq!(surface.tool(), ToolKind::Brush);

        surface.begin_stroke(5.0, 5.0).unwrap();
        surface.drain_events();
        surface.apply(SurfaceCommand::RequestClear).unwrap();
        assert!(surface.log().is_empty());
        assert!(matches!(
            surface.drain_events().as_slice(),
            [SurfaceEvent::ClearAcknowledged(_)]
        ));
    }

    #[test]
    fn test_load_matches_live_drawing() {
        let mut live = surface();
        live.select_tool(ToolKind::Brush);
        live.begin_stroke(5.0, 5.0).unwrap();
        live.continue_stroke(15.0, 8.0).unwrap();
        live.continue_stroke(25.0, 12.0).unwrap();
        live.end_stroke();

        let mut loaded = surface();
        loaded.load(live.log().clone()).unwrap();

        assert_eq!(loaded.drain_events().len(), 1);
        assert_eq!(loaded.log(), live.log());
        assert_eq!(loaded.snapshot().unwrap(), live.snapshot().unwrap());
    }

    #[test]
    fn test_detach_keeps_log() {
        let mut surface = surface();
        surface.begin_stroke(5.0, 5.0).unwrap();
        assert!(surface.detach().is_some());
        assert!(!surface.is_ready());
        assert!(!surface.is_drawing());
        assert_eq!(surface.log().len(), 1);
    }
}
