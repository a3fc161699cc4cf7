//! # Kakitori CLI
//!
//! Offline tools around the handwriting drill.
//!
//! ## Usage
//!
//! ```bash
//! # List the built-in katakana questions
//! kakitori catalog --katakana
//!
//! # Render a saved stroke log
//! kakitori render strokes.json --out strokes.png
//!
//! # Grade a saved drawing against question 2 ("I") as if the OCR read "わたし"
//! kakitori replay strokes.json --question 2 --text わたし --confidence 82
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CatalogSource` - Built-in or JSON catalog selection
//! - `render_strokes` - Stroke log to raster through the CPU backend
//! - `replay` - Session check driven by a fixed-transcript recognizer

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use kakitori_core::{
    Catalog, CheckOutcome, ConfidenceBand, FixedRecognizer, Navigation, Raster, Recognizer,
    Script, Session, StrokeLog,
};
use kakitori_renderer::{CanvasSurface, RasterBackend, SurfaceConfig};
use serde::Serialize;

/// Command-line arguments for kakitori.
#[derive(Debug, Clone, Parser)]
#[command(name = "kakitori")]
#[command(about = "Kakitori handwriting drill tools")]
#[command(version)]
pub struct CliArgs {
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a question catalog
    Catalog(CatalogArgs),
    /// Render a stroke log to PNG
    Render(RenderArgs),
    /// Replay a stroke log through a session and grade it
    Replay(ReplayArgs),
}

/// Which catalog to use.
#[derive(Debug, Clone, Args)]
pub struct CatalogSource {
    /// Use the katakana catalog instead of hiragana and kanji
    #[arg(long, env = "KAKITORI_KATAKANA")]
    pub katakana: bool,

    /// Load the catalog from a JSON file instead
    #[arg(long, env = "KAKITORI_CATALOG", conflicts_with = "katakana")]
    pub catalog: Option<PathBuf>,
}

impl CatalogSource {
    /// Load the selected catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or is invalid.
    pub fn load(&self) -> anyhow::Result<Catalog> {
        match &self.catalog {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                let catalog = Catalog::from_json(&json)
                    .with_context(|| format!("parsing catalog {}", path.display()))?;
                tracing::info!("Loaded {} questions from {}", catalog.len(), path.display());
                Ok(catalog)
            }
            None if self.katakana => Ok(Catalog::builtin(Script::Katakana)),
            None => Ok(Catalog::builtin(Script::Hiragana)),
        }
    }
}

/// Canvas size.
#[derive(Debug, Clone, Copy, Args)]
pub struct SurfaceArgs {
    /// Canvas width in pixels
    #[arg(long, default_value = "500")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value = "200")]
    pub height: u32,
}

impl From<SurfaceArgs> for SurfaceConfig {
    fn from(args: SurfaceArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            ..SurfaceConfig::default()
        }
    }
}

/// Arguments for `catalog`.
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Catalog selection
    #[command(flatten)]
    pub source: CatalogSource,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Stroke log JSON file
    pub strokes: PathBuf,

    /// Output PNG file
    #[arg(short, long)]
    pub out: PathBuf,

    /// Canvas size
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

/// Arguments for `replay`.
#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Stroke log JSON file
    pub strokes: PathBuf,

    /// Text the recognizer should report
    #[arg(long)]
    pub text: String,

    /// Confidence the recognizer should report, 0 to 100
    #[arg(long, default_value = "90")]
    pub confidence: f32,

    /// Zero-based question number in catalog order
    #[arg(long, default_value = "0")]
    pub question: usize,

    /// Also write the checked raster to this PNG file
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Catalog selection
    #[command(flatten)]
    pub source: CatalogSource,

    /// Canvas size
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

/// Result of a replayed check.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Prompt of the checked question.
    pub prompt: String,
    /// Accepted answers.
    pub answers: Vec<String>,
    /// Grading result.
    pub outcome: CheckOutcome,
    /// Confidence tier.
    pub band: ConfidenceBand,
}

/// Read a stroke log from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_strokes(path: &Path) -> anyhow::Result<StrokeLog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading strokes {}", path.display()))?;
    let log = StrokeLog::from_json(&json)
        .with_context(|| format!("parsing strokes {}", path.display()))?;
    tracing::debug!("Read {} stroke points from {}", log.len(), path.display());
    Ok(log)
}

/// Draw a stroke log on a fresh surface.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn render_strokes(log: &StrokeLog, config: SurfaceConfig) -> anyhow::Result<Raster> {
    let mut surface = surface(config)?;
    surface.load(log.clone())?;
    surface
        .snapshot()?
        .context("surface has no backend attached")
}

/// Format a catalog as a plain-text table.
#[must_use]
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} questions (lang={}, whitelist={} chars)",
        catalog.len(),
        catalog.recognizer_config().language,
        catalog.recognizer_config().char_whitelist.chars().count()
    );
    for (i, question) in catalog.questions().iter().enumerate() {
        let _ = writeln!(
            out,
            "{i:>3}  {:<12} {:<16} {}",
            question.prompt(),
            question.answers().join(" / "),
            question.hint()
        );
    }
    out
}

/// Grade a stroke log against one question.
///
/// # Errors
///
/// Returns an error if `question` is out of range, rendering fails, or the
/// recognizer fails.
pub async fn replay<R: Recognizer + ?Sized>(
    catalog: Catalog,
    question: usize,
    log: StrokeLog,
    recognizer: &R,
    config: SurfaceConfig,
) -> anyhow::Result<(ReplayReport, Raster)> {
    if question >= catalog.len() {
        bail!(
            "question {question} is out of range, the catalog has {}",
            catalog.len()
        );
    }

    let mut session = Session::with_seed(catalog, false, 0);
    for _ in 0..question {
        if session.next_question() != Navigation::Moved {
            bail!("could not advance to question {question}");
        }
    }

    let mut surface = surface(config)?;
    for command in session.drain_commands() {
        surface.apply(command)?;
    }
    surface.load(log)?;
    for event in surface.drain_events() {
        session.handle_surface_event(event);
    }

    let raster = session
        .raster()
        .cloned()
        .context("surface produced no raster")?;
    let outcome = session.check_answer(recognizer).await?;
    let question = session.current_question();
    let report = ReplayReport {
        prompt: question.prompt().to_string(),
        answers: question.answers().to_vec(),
        band: outcome.band(),
        outcome,
    };
    Ok((report, raster))
}

/// Run a parsed command line.
///
/// # Errors
///
/// Returns the first error from the selected command.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Command::Catalog(args) => {
            let catalog = args.source.load()?;
            if args.json {
                println!("{}", catalog.to_json()?);
            } else {
                print!("{}", format_catalog(&catalog));
            }
        }
        Command::Render(args) => {
            let log = read_strokes(&args.strokes)?;
            let raster = render_strokes(&log, args.surface.into())?;
            write_png(&raster, &args.out)?;
            println!("{} points -> {}", log.len(), args.out.display());
        }
        Command::Replay(args) => {
            let catalog = args.source.load()?;
            let log = read_strokes(&args.strokes)?;
            let recognizer = FixedRecognizer::new(args.text, args.confidence);
            let (report, raster) = replay(
                catalog,
                args.question,
                log,
                &recognizer,
                args.surface.into(),
            )
            .await?;
            if let Some(path) = &args.png {
                write_png(&raster, path)?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn surface(config: SurfaceConfig) -> anyhow::Result<CanvasSurface<RasterBackend>> {
    let backend = RasterBackend::new(config.width, config.height);
    Ok(CanvasSurface::with_backend(config, backend)?)
}

fn write_png(raster: &Raster, path: &Path) -> anyhow::Result<()> {
    let png = kakitori_renderer::export::encode_png(raster)?;
    std::fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Wrote {}x{} PNG to {}", raster.width(), raster.height(), path.display());
    Ok(())
}
