//! # Kakitori WASM Application
//!
//! Browser bindings for the handwriting drill: a `<canvas>` to write on, a
//! session asking the questions, and Tesseract.js reading the answer.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web kakitori-app
//! ```
//!
//! Then import in JavaScript (Tesseract.js must be loaded on the page):
//! ```javascript
//! import init, { DrillApp } from './pkg/kakitori_app.js';
//!
//! await init();
//! const app = new DrillApp('drawing');  // reads ?randomize&katakana
//! app.onChange((json) => render(JSON.parse(json)));
//! await app.warmUp();
//!
//! canvas.onpointerdown = (e) => app.pointerDown(e.pageX, e.pageY);
//! canvas.onpointermove = (e) => app.pointerMove(e.pageX, e.pageY);
//! canvas.onpointerup = () => app.pointerUp();
//! window.onresize = () => app.updateOffset();
//! checkButton.onclick = () => app.checkAnswer().catch(showError);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;
pub mod drill;
pub mod error;
pub mod recognizer;

pub use dom::DomCanvasBackend;
pub use drill::Drill;
pub use error::{AppError, AppResult};
pub use recognizer::TesseractRecognizer;

use std::{cell::RefCell, fmt::Display, rc::Rc};

use kakitori_core::{
    LaunchConfig, Navigation, PointerEvent, PointerPhase, Progress, Recognizer, Session,
};
use kakitori_renderer::{CanvasSurface, SurfaceConfig};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        tracing::debug!("Console logger already installed");
    }
    tracing::info!("Kakitori WASM initialized");
}

type DrillHandle = Rc<RefCell<Drill<DomCanvasBackend>>>;
type ListenerHandle = Rc<RefCell<Option<js_sys::Function>>>;

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Call the change listener with the current session view.
fn notify(drill: &DrillHandle, listener: &ListenerHandle) {
    let json = match drill.try_borrow().map(|d| d.view_json()) {
        Ok(Ok(json)) => json,
        Ok(Err(e)) => {
            tracing::warn!("Failed to serialize session view: {e}");
            return;
        }
        Err(_) => return,
    };
    let callback = listener.borrow().clone();
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            tracing::warn!("Change listener threw: {:?}", e);
        }
    }
}

/// The handwriting drill for the browser.
#[wasm_bindgen]
pub struct DrillApp {
    drill: DrillHandle,
    recognizer: Rc<TesseractRecognizer>,
    listener: ListenerHandle,
}

#[wasm_bindgen]
impl DrillApp {
    /// Create the app on the canvas with the given element id.
    ///
    /// Launch flags come from the page query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas element is not found or 2D context fails.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<DrillApp, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;

        let query = window.location().search().unwrap_or_default();
        let config = LaunchConfig::from_query(&query);
        let session = Session::from_config(&config);

        let backend = DomCanvasBackend::from_element_id(&document, canvas_id).map_err(to_js)?;
        let (left, top) = backend.page_offset();
        let (width, height) = kakitori_renderer::RenderBackend::size(&backend);
        let surface_config = SurfaceConfig {
            width,
            height,
            ..SurfaceConfig::default()
        };
        let mut surface = CanvasSurface::with_backend(surface_config, backend).map_err(to_js)?;
        surface.set_offset(left, top);

        let drill = Drill::new(session, surface).map_err(to_js)?;
        tracing::info!(
            "Drill ready on '{}' ({}x{}, {} questions)",
            canvas_id,
            width,
            height,
            drill.session().len()
        );

        Ok(Self {
            drill: Rc::new(RefCell::new(drill)),
            recognizer: Rc::new(TesseractRecognizer::default()),
            listener: Rc::new(RefCell::new(None)),
        })
    }

    /// Register a callback receiving the session view JSON after every change.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        *self.listener.borrow_mut() = Some(callback);
        self.notify();
    }

    /// Load the recognizer's language data ahead of the first check.
    #[wasm_bindgen(js_name = warmUp)]
    #[must_use]
    pub fn warm_up(&self) -> js_sys::Promise {
        let drill = Rc::clone(&self.drill);
        let recognizer = Rc::clone(&self.recognizer);
        wasm_bindgen_futures::future_to_promise(async move {
            let warm_up = drill.borrow().session().warm_up(recognizer.as_ref());
            warm_up.await.map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    // ------------------------------------------------------------------
    // Pointer and viewport
    // ------------------------------------------------------------------

    /// Dispatch a pointer event by DOM event type (`pointerdown`, `mousemove`,
    /// `up`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown event type or a failed redraw.
    #[wasm_bindgen(js_name = handlePointer)]
    pub fn handle_pointer(&self, kind: &str, page_x: f32, page_y: f32) -> Result<(), JsValue> {
        let phase = PointerPhase::from_name(kind)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown pointer event '{kind}'")))?;
        self.pointer(phase, page_x, page_y)
    }

    /// Pen down at page coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, page_x: f32, page_y: f32) -> Result<(), JsValue> {
        self.pointer(PointerPhase::Down, page_x, page_y)
    }

    /// Pointer moved to page coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, page_x: f32, page_y: f32) -> Result<(), JsValue> {
        self.pointer(PointerPhase::Move, page_x, page_y)
    }

    /// Pen up.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) {
        if let Err(e) = self.pointer(PointerPhase::Up, 0.0, 0.0) {
            tracing::warn!("Pointer up failed: {:?}", e);
        }
    }

    /// Re-read the canvas position after a layout change.
    #[wasm_bindgen(js_name = updateOffset)]
    pub fn update_offset(&self) {
        let mut drill = self.drill.borrow_mut();
        let Some((left, top)) = drill.surface().backend().map(DomCanvasBackend::page_offset)
        else {
            return;
        };
        drill.set_offset(left, top);
    }

    /// Change the canvas pixel size and redraw the strokes.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.drill.borrow_mut().resize(width, height).map_err(to_js)?;
        self.update_offset();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------

    /// Select `pencil`, `brush` or `eraser`.
    ///
    /// # Errors
    ///
    /// Returns an error for any other tool name.
    #[wasm_bindgen(js_name = selectTool)]
    pub fn select_tool(&self, name: &str) -> Result<(), JsValue> {
        self.drill.borrow_mut().select_tool(name).map_err(to_js)?;
        self.notify();
        Ok(())
    }

    /// Wipe the drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the repaint fails.
    pub fn clear(&self) -> Result<(), JsValue> {
        self.drill.borrow_mut().clear().map_err(to_js)?;
        self.notify();
        Ok(())
    }

    /// Step back one question. Returns `false` if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas fails to clear.
    #[wasm_bindgen(js_name = previousQuestion)]
    pub fn previous_question(&self) -> Result<bool, JsValue> {
        let nav = self.drill.borrow_mut().previous_question().map_err(to_js)?;
        self.notify();
        Ok(nav == Navigation::Moved)
    }

    /// Step forward one question. Returns `false` if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas fails to clear.
    #[wasm_bindgen(js_name = nextQuestion)]
    pub fn next_question(&self) -> Result<bool, JsValue> {
        let nav = self.drill.borrow_mut().next_question().map_err(to_js)?;
        self.notify();
        Ok(nav != Navigation::Ignored)
    }

    /// Start over from the first question.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas fails to clear.
    pub fn restart(&self) -> Result<(), JsValue> {
        self.drill.borrow_mut().restart().map_err(to_js)?;
        self.notify();
        Ok(())
    }

    /// Show or hide the hint.
    #[wasm_bindgen(js_name = toggleHint)]
    pub fn toggle_hint(&self) {
        self.drill.borrow_mut().toggle_hint();
        self.notify();
    }

    /// Read and grade the drawing.
    ///
    /// Resolves with the outcome JSON. Rejects when the check cannot start,
    /// the recognizer fails or times out, or the question changed meanwhile.
    ///
    /// # Errors
    ///
    /// Returns an error synchronously if the check cannot start.
    #[wasm_bindgen(js_name = checkAnswer)]
    pub fn check_answer(&self) -> Result<js_sys::Promise, JsValue> {
        let request = self
            .drill
            .borrow_mut()
            .begin_check(&*self.recognizer)
            .map_err(to_js)?;
        self.notify();

        let drill = Rc::clone(&self.drill);
        let recognizer = Rc::clone(&self.recognizer);
        let listener = Rc::clone(&self.listener);
        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let ticket = request.ticket;
            let mut on_progress = |update: Progress| {
                let accepted = drill
                    .try_borrow_mut()
                    .is_ok_and(|mut d| d.report_progress(ticket, update));
                if accepted {
                    notify(&drill, &listener);
                }
            };
            let result = recognizer
                .recognize(&request.raster, &request.config, &mut on_progress)
                .await;

            let outcome = drill.borrow_mut().complete_check(ticket, result);
            notify(&drill, &listener);
            let outcome = outcome.map_err(to_js)?;
            serde_json::to_string(&outcome)
                .map(|json| JsValue::from_str(&json))
                .map_err(to_js)
        }))
    }

    /// Abandon the outstanding or failed check.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is being checked.
    #[wasm_bindgen(js_name = cancelCheck)]
    pub fn cancel_check(&self) -> Result<(), JsValue> {
        self.drill.borrow_mut().cancel_check().map_err(to_js)?;
        self.notify();
        Ok(())
    }

    /// The session view as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.drill.borrow().view_json().map_err(to_js)
    }

    /// The stroke log as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = strokesJson)]
    pub fn strokes_json(&self) -> Result<String, JsValue> {
        self.drill.borrow().surface().log().to_json().map_err(to_js)
    }
}

impl DrillApp {
    fn pointer(&self, phase: PointerPhase, page_x: f32, page_y: f32) -> Result<(), JsValue> {
        self.drill
            .borrow_mut()
            .handle_pointer(PointerEvent::new(phase, page_x, page_y))
            .map_err(to_js)
    }

    fn notify(&self) {
        notify(&self.drill, &self.listener);
    }
}
