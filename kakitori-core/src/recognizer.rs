//! The handwriting recognizer seam.
//!
//! Recognition is delegated to an external OCR engine (Tesseract.js in the
//! browser). The engine reports progress while it works and then resolves
//! with the recognised text and a confidence score.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Raster;

/// Errors reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    /// The engine is not loaded or could not be reached.
    #[error("Recognizer unavailable: {0}")]
    Unavailable(String),

    /// The engine rejected the image or crashed.
    #[error("Recognizer failed: {0}")]
    Failed(String),

    /// The engine did not answer in time.
    #[error("Recognizer timed out after {0} ms")]
    Timeout(u64),
}

/// Settings sent along with every image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Engine language code, e.g. `jpn`.
    pub language: String,
    /// Characters the engine may output.
    pub char_whitelist: String,
}

/// An incremental progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Engine status label, e.g. `recognizing text`.
    pub status: String,
    /// Completion in `[0, 1]`.
    pub fraction: f32,
}

impl Progress {
    /// Create a progress notification, clamping the fraction into `[0, 1]`.
    #[must_use]
    pub fn new(status: impl Into<String>, fraction: f32) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self {
            status: status.into(),
            fraction,
        }
    }

    /// Completion as a percentage.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.fraction * 100.0
    }
}

/// The final answer from a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Recognised text, whitespace included.
    pub text: String,
    /// Confidence in `[0, 100]`.
    pub confidence: f32,
}

impl Recognition {
    /// Create a recognition, clamping confidence into `[0, 100]`.
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 100.0)
        };
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// An OCR engine able to read a raster.
///
/// Futures are not required to be `Send`: browser engines resolve through
/// JavaScript promises on the main thread.
#[async_trait(?Send)]
pub trait Recognizer {
    /// Whether the engine can accept work right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Optional warm-up, e.g. loading language data ahead of the first check.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to load.
    async fn warm_up(&self, _config: &RecognizerConfig) -> Result<(), RecognizerError> {
        Ok(())
    }

    /// Recognise the text in a raster.
    ///
    /// `progress` is called with non-decreasing fractions before the future
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if recognition fails or times out.
    async fn recognize(
        &self,
        raster: &Raster,
        config: &RecognizerConfig,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<Recognition, RecognizerError>;
}

/// A recognizer that always reads the same transcript.
///
/// Used for offline replays and tests.
#[derive(Debug, Clone)]
pub struct FixedRecognizer {
    outcome: Result<Recognition, RecognizerError>,
}

impl FixedRecognizer {
    /// Always answer with `text` at the given confidence.
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            outcome: Ok(Recognition::new(text, confidence)),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: RecognizerError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait(?Send)]
impl Recognizer for FixedRecognizer {
    async fn recognize(
        &self,
        raster: &Raster,
        config: &RecognizerConfig,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<Recognition, RecognizerError> {
        tracing::debug!(
            "Fixed recognizer reading {}x{} raster (lang={})",
            raster.width(),
            raster.height(),
            config.language
        );
        progress(Progress::new("initializing api", 0.0));
        progress(Progress::new("recognizing text", 0.5));
        progress(Progress::new("recognizing text", 1.0));
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgba;

    #[test]
    fn progress_is_clamped() {
        assert!((Progress::new("x", 1.7).fraction - 1.0).abs() < f32::EPSILON);
        assert!(Progress::new("x", -0.2).fraction.abs() < f32::EPSILON);
        assert!(Progress::new("x", f32::NAN).fraction.abs() < f32::EPSILON);
        assert!((Progress::new("x", 0.25).percent() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn confidence_is_clamped() {
        assert!((Recognition::new("a", 140.0).confidence - 100.0).abs() < f32::EPSILON);
        assert!(Recognition::new("a", -3.0).confidence.abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn fixed_recognizer_reports_monotonic_progress() {
        let recognizer = FixedRecognizer::new("いち", 88.0);
        let raster = Raster::filled(4, 4, Rgba::WHITE);
        let config = RecognizerConfig {
            language: "jpn".to_string(),
            char_whitelist: "いち".to_string(),
        };
        let mut seen = Vec::new();
        let result = recognizer
            .recognize(&raster, &config, &mut |p| seen.push(p.fraction))
            .await
            .unwrap();
        assert_eq!(result.text, "いち");
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!((seen.last().copied().unwrap() - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn failing_recognizer_returns_its_error() {
        let recognizer = FixedRecognizer::failing(RecognizerError::Timeout(500));
        let raster = Raster::filled(1, 1, Rgba::WHITE);
        let config = RecognizerConfig {
            language: "jpn".to_string(),
            char_whitelist: String::new(),
        };
        let err = recognizer
            .recognize(&raster, &config, &mut |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, RecognizerError::Timeout(500));
    }
}
