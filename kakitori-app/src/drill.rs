//! Platform-neutral wiring between the drawing surface and the session.
//!
//! [`Drill`] forwards surface rasters to the session and session commands to
//! the surface after every operation, so the two never observe each other
//! half-updated. The browser bindings wrap a `Drill` over the DOM backend;
//! everything here also runs natively over the CPU backend.

use kakitori_core::{
    CheckOutcome, CheckRequest, CheckTicket, Navigation, PointerEvent, Progress, Recognition,
    Recognizer, RecognizerError, Session, SessionView, SurfaceCommand, ToolKind,
};
use kakitori_renderer::{CanvasSurface, RenderBackend};

use crate::error::AppResult;

/// A session bound to a drawing surface.
#[derive(Debug)]
pub struct Drill<B> {
    session: Session,
    surface: CanvasSurface<B>,
}

impl<B: RenderBackend> Drill<B> {
    /// Bind a session to a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to apply pending commands.
    pub fn new(session: Session, surface: CanvasSurface<B>) -> AppResult<Self> {
        let mut drill = Self { session, surface };
        drill.pump()?;
        Ok(drill)
    }

    /// The session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &CanvasSurface<B> {
        &self.surface
    }

    /// Snapshot of the session for the UI.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    /// The session snapshot as JSON, with the surface's active tool added as
    /// `tool`. Clearing can swap the eraser for the pencil, so a toolbar
    /// should follow this field rather than its own clicks.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn view_json(&self) -> AppResult<String> {
        let mut view = serde_json::to_value(self.session.view())?;
        if let Some(fields) = view.as_object_mut() {
            fields.insert("tool".to_string(), serde_json::to_value(self.surface.tool())?);
        }
        Ok(view.to_string())
    }

    // ------------------------------------------------------------------
    // Surface
    // ------------------------------------------------------------------

    /// Dispatch a pointer event in page coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to redraw.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> AppResult<()> {
        self.surface.handle_pointer(event)?;
        self.pump()
    }

    /// Select a tool by name (`pencil`, `brush`, `eraser`).
    ///
    /// # Errors
    ///
    /// Returns [`kakitori_core::DrillError::UnknownTool`] for any other name.
    pub fn select_tool(&mut self, name: &str) -> AppResult<ToolKind> {
        let tool: ToolKind = name.parse()?;
        self.surface.apply(SurfaceCommand::SetTool(tool))?;
        Ok(tool)
    }

    /// Wipe the drawing and its stroke log.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to repaint.
    pub fn clear(&mut self) -> AppResult<()> {
        self.surface.apply(SurfaceCommand::RequestClear)?;
        self.pump()
    }

    /// Record where the surface sits on the page.
    pub fn set_offset(&mut self, left: f32, top: f32) {
        self.surface.set_offset(left, top);
    }

    /// Resize the pixel area and redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to resize.
    pub fn resize(&mut self, width: u32, height: u32) -> AppResult<()> {
        self.surface.resize(width, height)?;
        self.pump()
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Step back one question.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to clear.
    pub fn previous_question(&mut self) -> AppResult<Navigation> {
        let nav = self.session.previous_question();
        self.pump()?;
        Ok(nav)
    }

    /// Step forward one question or finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to clear.
    pub fn next_question(&mut self) -> AppResult<Navigation> {
        let nav = self.session.next_question();
        self.pump()?;
        Ok(nav)
    }

    /// Start over from the first question.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to clear.
    pub fn restart(&mut self) -> AppResult<()> {
        self.session.restart();
        self.pump()
    }

    /// Flip hint visibility.
    pub fn toggle_hint(&mut self) {
        self.session.toggle_hint();
    }

    /// Start a check of the current drawing.
    ///
    /// # Errors
    ///
    /// `NotReady` or `Busy` from the session.
    pub fn begin_check<R: Recognizer + ?Sized>(&mut self, recognizer: &R) -> AppResult<CheckRequest> {
        Ok(self.session.begin_check(recognizer)?)
    }

    /// Forward recognizer progress. Returns whether it was accepted.
    pub fn report_progress(&mut self, ticket: CheckTicket, update: Progress) -> bool {
        self.session.report_progress(ticket, update)
    }

    /// Grade a finished recognition.
    ///
    /// # Errors
    ///
    /// Stale tickets and recognizer failures, see
    /// [`Session::complete_check`].
    pub fn complete_check(
        &mut self,
        ticket: CheckTicket,
        result: Result<Recognition, RecognizerError>,
    ) -> AppResult<CheckOutcome> {
        Ok(self.session.complete_check(ticket, result)?)
    }

    /// Abandon the outstanding check.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is being checked.
    pub fn cancel_check(&mut self) -> AppResult<()> {
        Ok(self.session.cancel_check()?)
    }

    /// Deliver session commands to the surface and surface rasters to the
    /// session until both queues are empty.
    fn pump(&mut self) -> AppResult<()> {
        loop {
            let commands = self.session.drain_commands();
            for command in &commands {
                self.surface.apply(*command)?;
            }
            let events = self.surface.drain_events();
            if commands.is_empty() && events.is_empty() {
                return Ok(());
            }
            for event in events {
                self.session.handle_surface_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakitori_core::{
        AnswerState, Catalog, DrillError, FixedRecognizer, PointerPhase, Question, Rgba,
    };
    use kakitori_renderer::{RasterBackend, SurfaceConfig};

    use crate::error::AppError;

    fn session() -> Session {
        let catalog = Catalog::new(
            "jpn",
            "いちに",
            vec![
                Question::new("one", ["一", "いち"], "ichi"),
                Question::new("two", ["二", "に"], "ni"),
            ],
        )
        .unwrap();
        Session::with_seed(catalog, false, 1)
    }

    fn config() -> SurfaceConfig {
        SurfaceConfig {
            width: 60,
            height: 30,
            background: Rgba::WHITE,
        }
    }

    fn drill() -> Drill<RasterBackend> {
        let surface = CanvasSurface::with_backend(config(), RasterBackend::new(60, 30)).unwrap();
        Drill::new(session(), surface).unwrap()
    }

    fn draw(drill: &mut Drill<RasterBackend>) {
        drill
            .handle_pointer(PointerEvent::new(PointerPhase::Down, 10.0, 10.0))
            .unwrap();
        drill
            .handle_pointer(PointerEvent::new(PointerPhase::Move, 30.0, 15.0))
            .unwrap();
        drill
            .handle_pointer(PointerEvent::new(PointerPhase::Up, 30.0, 15.0))
            .unwrap();
    }

    #[test]
    fn test_strokes_reach_the_session() {
        let mut drill = drill();
        assert_eq!(drill.session().raster().unwrap().count_not(Rgba::WHITE), 0);
        draw(&mut drill);
        let raster = drill.session().raster().unwrap();
        assert!(raster.count_not(Rgba::WHITE) > 0);
    }

    #[test]
    fn test_navigation_clears_the_surface() {
        let mut drill = drill();
        draw(&mut drill);
        assert_eq!(drill.next_question().unwrap(), Navigation::Moved);

        assert!(drill.surface().log().is_empty());
        let raster = drill.session().raster().unwrap();
        assert_eq!(raster.count_not(Rgba::WHITE), 0);
    }

    #[test]
    fn test_view_follows_eraser_reset_on_navigation() {
        let mut drill = drill();
        drill.select_tool("eraser").unwrap();
        let view: serde_json::Value = serde_json::from_str(&drill.view_json().unwrap()).unwrap();
        assert_eq!(view["tool"], "eraser");

        assert_eq!(drill.next_question().unwrap(), Navigation::Moved);
        let view: serde_json::Value = serde_json::from_str(&drill.view_json().unwrap()).unwrap();
        assert_eq!(view["tool"], "pencil");
        assert_eq!(view["index"], 1);

        drill.select_tool("eraser").unwrap();
        drill.restart().unwrap();
        let view: serde_json::Value = serde_json::from_str(&drill.view_json().unwrap()).unwrap();
        assert_eq!(view["tool"], "pencil");
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let mut drill = drill();
        assert!(matches!(
            drill.select_tool("crayon"),
            Err(AppError::Drill(DrillError::UnknownTool(_)))
        ));
        assert_eq!(drill.select_tool("Brush").unwrap(), ToolKind::Brush);
        assert_eq!(drill.surface().tool(), ToolKind::Brush);
    }

    #[test]
    fn test_untouched_check_same_on_every_question() {
        let recognizer = FixedRecognizer::new("", 0.0);

        let mut first = drill();
        let request = first.begin_check(&recognizer).unwrap();
        assert_eq!(request.raster.count_not(Rgba::WHITE), 0);

        let mut second = drill();
        assert_eq!(second.next_question().unwrap(), Navigation::Moved);
        let request = second.begin_check(&recognizer).unwrap();
        assert_eq!(request.raster.count_not(Rgba::WHITE), 0);
    }

    #[test]
    fn test_check_without_backend_is_not_ready() {
        let surface = CanvasSurface::new(config());
        let mut drill: Drill<RasterBackend> = Drill::new(session(), surface).unwrap();
        let recognizer = FixedRecognizer::new("いち", 90.0);
        assert!(matches!(
            drill.begin_check(&recognizer),
            Err(AppError::Drill(DrillError::NotReady(_)))
        ));
    }

    #[test]
    fn test_full_check_flow() {
        let mut drill = drill();
        draw(&mut drill);
        let recognizer = FixedRecognizer::new(" いち ", 82.0);

        let request = drill.begin_check(&recognizer).unwrap();
        assert!(matches!(
            drill.begin_check(&recognizer),
            Err(AppError::Drill(DrillError::Busy))
        ));

        let mut updates = Vec::new();
        let result = futures::executor::block_on(recognizer.recognize(
            &request.raster,
            &request.config,
            &mut |p| updates.push(p),
        ));
        for update in updates {
            assert!(drill.report_progress(request.ticket, update));
        }
        let outcome = drill.complete_check(request.ticket, result).unwrap();
        assert!(outcome.is_correct());
        assert_eq!(outcome.recognized, "いち");

        let view: SessionView = serde_json::from_str(&drill.view_json().unwrap()).unwrap();
        assert_eq!(view.correct, Some(true));
    }

    #[test]
    fn test_result_after_navigation_is_stale() {
        let mut drill = drill();
        draw(&mut drill);
        let recognizer = FixedRecognizer::new("いち", 90.0);
        let request = drill.begin_check(&recognizer).unwrap();

        drill.next_question().unwrap();
        let late = drill.complete_check(request.ticket, Ok(Recognition::new("いち", 90.0)));
        assert!(matches!(
            late,
            Err(AppError::Drill(DrillError::StaleResult(_)))
        ));
        assert_eq!(drill.session().answer_state(), &AnswerState::Unanswered);
    }

    #[test]
    fn test_clear_keeps_the_question() {
        let mut drill = drill();
        draw(&mut drill);
        drill.toggle_hint();
        drill.clear().unwrap();

        assert!(drill.surface().log().is_empty());
        assert_eq!(drill.view().hint.as_deref(), Some("ichi"));
        assert_eq!(drill.session().current_index(), 0);
    }
}
