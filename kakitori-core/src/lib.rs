//! # Kakitori Core
//!
//! Core logic for handwriting flashcards. Compiles to WASM and native alike.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               kakitori-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Stroke Log      │  Session Controller      │
//! │  - Points        │  - Question order        │
//! │  - Tool styles   │  - Navigation            │
//! │  - Replay        │  - Answer checking       │
//! ├─────────────────────────────────────────────┤
//! │  Catalog         │  Recognizer seam         │
//! │  - Built-ins     │  - Progress reporting    │
//! │  - JSON loading  │  - Warm-up               │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod raster;
pub mod recognizer;
pub mod session;
pub mod stroke;
pub mod tool;

pub use catalog::{Catalog, Question, Script};
pub use config::LaunchConfig;
pub use error::{DrillError, DrillResult};
pub use event::{PointerEvent, PointerPhase, SurfaceCommand, SurfaceEvent};
pub use raster::{Raster, Rgba};
pub use recognizer::{
    FixedRecognizer, Progress, Recognition, Recognizer, RecognizerConfig, RecognizerError,
};
pub use session::{
    AnswerState, CheckOutcome, CheckRequest, CheckTicket, ConfidenceBand, Grade, Navigation,
    Session, SessionView,
};
pub use stroke::{Segment, StrokeLog, StrokePoint};
pub use tool::{StrokeStyle, ToolKind};

/// Kakitori core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
