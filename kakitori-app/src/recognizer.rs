//! Tesseract.js behind the [`Recognizer`] trait.
//!
//! The heavy lifting happens in `js/recognizer.js`, which owns the Tesseract
//! worker and enforces the timeout. Progress arrives through a JS callback
//! and is relayed over a channel so it can be handed to the borrowed
//! progress sink while the recognition promise is still pending.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::{FutureExt, StreamExt};
use js_sys::{Reflect, Uint8ClampedArray};
use kakitori_core::{Progress, Raster, Recognition, Recognizer, RecognizerConfig, RecognizerError};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/recognizer.js")]
extern "C" {
    #[wasm_bindgen(js_name = isReady)]
    fn js_is_ready() -> bool;

    #[wasm_bindgen(catch, js_name = warmUp)]
    async fn js_warm_up(language: &str, whitelist: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = recognize)]
    async fn js_recognize(
        pixels: Uint8ClampedArray,
        width: u32,
        height: u32,
        language: &str,
        whitelist: &str,
        timeout_ms: u32,
        on_progress: &Closure<dyn FnMut(String, f64)>,
    ) -> Result<JsValue, JsValue>;
}

/// Default time allowed for one recognition.
pub const DEFAULT_TIMEOUT_MS: u32 = 30_000;

/// Recognizer backed by Tesseract.js.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    timeout_ms: u32,
}

impl TesseractRecognizer {
    /// Create a recognizer with the given per-check timeout.
    #[must_use]
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

#[async_trait(?Send)]
impl Recognizer for TesseractRecognizer {
    fn is_ready(&self) -> bool {
        js_is_ready()
    }

    async fn warm_up(&self, config: &RecognizerConfig) -> Result<(), RecognizerError> {
        js_warm_up(&config.language, &config.char_whitelist)
            .await
            .map(|_| ())
            .map_err(|e| RecognizerError::Unavailable(describe(&e)))
    }

    async fn recognize(
        &self,
        raster: &Raster,
        config: &RecognizerConfig,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<Recognition, RecognizerError> {
        let (tx, mut rx) = mpsc::unbounded();
        #[allow(clippy::cast_possible_truncation)]
        let on_progress = Closure::<dyn FnMut(String, f64)>::new(move |status: String, fraction: f64| {
            let _ = tx.unbounded_send(Progress::new(status, fraction as f32));
        });

        let pixels = Uint8ClampedArray::from(raster.as_rgba());
        let pending = js_recognize(
            pixels,
            raster.width(),
            raster.height(),
            &config.language,
            &config.char_whitelist,
            self.timeout_ms,
            &on_progress,
        )
        .fuse();
        futures::pin_mut!(pending);

        let result = loop {
            futures::select! {
                update = rx.select_next_some() => progress(update),
                result = pending => break result,
            }
        };
        while let Ok(Some(update)) = rx.try_next() {
            progress(update);
        }

        match result {
            Ok(value) => Ok(parse_recognition(&value)),
            Err(e) => Err(self.classify(&e)),
        }
    }
}

impl TesseractRecognizer {
    fn classify(&self, error: &JsValue) -> RecognizerError {
        let is_timeout = error
            .dyn_ref::<js_sys::Error>()
            .is_some_and(|e| String::from(e.name()) == "TimeoutError");
        if is_timeout {
            RecognizerError::Timeout(u64::from(self.timeout_ms))
        } else {
            RecognizerError::Failed(describe(error))
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_recognition(value: &JsValue) -> Recognition {
    let text = Reflect::get(value, &JsValue::from_str("text"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    let confidence = Reflect::get(value, &JsValue::from_str("confidence"))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Recognition::new(text, confidence as f32)
}

fn describe(error: &JsValue) -> String {
    if let Some(e) = error.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    error.as_string().unwrap_or_else(|| format!("{error:?}"))
}
