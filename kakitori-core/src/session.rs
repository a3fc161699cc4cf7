//! The drill session: question order, navigation and answer checking.
//!
//! Per question the answer moves `Unanswered → Checking → Graded` and falls
//! back to `Unanswered` whenever the current question changes. The session as
//! a whole runs until the learner steps past the last question, after which it
//! stays done until [`Session::restart`].
//!
//! Checking is split in two halves so a host can release its borrow while the
//! recognizer works: [`Session::begin_check`] hands out a ticketed
//! [`CheckRequest`], and [`Session::complete_check`] grades the result. A
//! result whose ticket no longer matches (the learner navigated meanwhile) is
//! rejected. [`Session::check_answer`] drives both halves for callers that
//! can hold the session across the await.

use std::future::Future;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{
    Catalog, DrillError, DrillResult, LaunchConfig, Progress, Question, Raster, Recognition,
    Recognizer, RecognizerConfig, RecognizerError, SurfaceCommand, SurfaceEvent,
};

/// Confidence below this is low.
const LOW_CONFIDENCE: f32 = 50.0;
/// Confidence at or above this is high.
const HIGH_CONFIDENCE: f32 = 75.0;

/// Presentation tier for a recognizer confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    /// Below 50.
    Low,
    /// 50 up to (not including) 75.
    Medium,
    /// 75 and above.
    High,
}

impl ConfidenceBand {
    /// Band for a confidence in `[0, 100]`.
    #[must_use]
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence < LOW_CONFIDENCE {
            Self::Low
        } else if confidence < HIGH_CONFIDENCE {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Whether the recognised text matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Matched an accepted answer.
    Correct,
    /// Matched nothing.
    Incorrect,
}

/// Identifies one recognition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckTicket(u64);

impl CheckTicket {
    /// Numeric id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Everything a recognizer needs for one check.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    /// Ticket to hand back to [`Session::complete_check`].
    pub ticket: CheckTicket,
    /// Image to recognise.
    pub raster: Raster,
    /// Engine settings for the active catalog.
    pub config: RecognizerConfig,
}

/// A graded answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Recognised text with all whitespace removed.
    pub recognized: String,
    /// Grade against the current question.
    pub grade: Grade,
    /// Recognizer confidence in `[0, 100]`.
    pub confidence: f32,
}

impl CheckOutcome {
    /// Whether the answer was accepted.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.grade == Grade::Correct
    }

    /// Presentation tier of the confidence.
    #[must_use]
    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

/// Answer state of the current question.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerState {
    /// Nothing checked yet.
    Unanswered,
    /// A recognition is outstanding, or failed and awaits retry or cancel.
    Checking {
        /// Ticket of the outstanding request.
        ticket: CheckTicket,
        /// Latest progress notification.
        progress: Option<Progress>,
        /// Set when the recognizer failed.
        failure: Option<RecognizerError>,
    },
    /// The recognizer answered and the text was graded.
    Graded(CheckOutcome),
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The current question changed.
    Moved,
    /// Out of bounds; nothing changed.
    Ignored,
    /// Stepped past the last question; the session is done.
    Finished,
}

/// Read-only snapshot for a UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    /// English prompt of the current question.
    pub prompt: String,
    /// Hint, present only while shown.
    pub hint: Option<String>,
    /// Position in the question order, zero based.
    pub index: usize,
    /// Number of questions.
    pub total: usize,
    /// Whether the learner stepped past the last question.
    pub done: bool,
    /// Whether a recognition is outstanding.
    pub checking: bool,
    /// Last recognizer status label.
    pub status: Option<String>,
    /// Progress of the outstanding recognition, in percent.
    pub progress_percent: f32,
    /// Failure message of the last recognition attempt.
    pub failure: Option<String>,
    /// Recognised text of the graded answer.
    pub recognized: String,
    /// `None` until graded.
    pub correct: Option<bool>,
    /// Confidence of the graded answer.
    pub confidence: f32,
    /// Confidence tier of the graded answer.
    pub band: Option<ConfidenceBand>,
}

/// A drill over one catalog.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    randomize: bool,
    order: Vec<usize>,
    index: usize,
    done: bool,
    hint_visible: bool,
    answer: AnswerState,
    raster: Option<Raster>,
    next_ticket: u64,
    rng: StdRng,
    commands: Vec<SurfaceCommand>,
}

impl Session {
    /// Start a session over a catalog, shuffling from OS entropy.
    #[must_use]
    pub fn new(catalog: Catalog, randomize: bool) -> Self {
        Self::with_rng(catalog, randomize, StdRng::from_entropy())
    }

    /// Start a session with a fixed shuffle seed.
    #[must_use]
    pub fn with_seed(catalog: Catalog, randomize: bool, seed: u64) -> Self {
        Self::with_rng(catalog, randomize, StdRng::seed_from_u64(seed))
    }

    /// Start a session over the built-in catalog chosen by `config`.
    #[must_use]
    pub fn from_config(config: &LaunchConfig) -> Self {
        let catalog = Catalog::builtin(config.script);
        match config.seed {
            Some(seed) => Self::with_seed(catalog, config.randomize, seed),
            None => Self::new(catalog, config.randomize),
        }
    }

    fn with_rng(catalog: Catalog, randomize: bool, rng: StdRng) -> Self {
        let order = (0..catalog.len()).collect();
        let mut session = Self {
            catalog,
            randomize,
            order,
            index: 0,
            done: false,
            hint_visible: false,
            answer: AnswerState::Unanswered,
            raster: None,
            next_ticket: 0,
            rng,
            commands: Vec::new(),
        };
        if randomize {
            session.shuffle();
        }
        tracing::info!(
            "Session started: {} questions, randomize={}",
            session.order.len(),
            randomize
        );
        session
    }

    fn shuffle(&mut self) {
        self.order.shuffle(&mut self.rng);
        tracing::debug!("Question order: {:?}", self.order);
    }

    /// Prime the recognizer with the catalog settings.
    ///
    /// Optional: recognizers that need no warm-up report ready from the start.
    /// The returned future holds no borrow of the session, so the drill keeps
    /// running while the recognizer loads.
    ///
    /// # Errors
    ///
    /// The future returns the recognizer's error if warm-up fails.
    pub fn warm_up<'r, R: Recognizer + ?Sized>(
        &self,
        recognizer: &'r R,
    ) -> impl Future<Output = DrillResult<()>> + 'r {
        let config = self.catalog.recognizer_config();
        async move {
            match recognizer.warm_up(&config).await {
                Ok(()) => {
                    tracing::info!("Recognizer warmed up (lang={})", config.language);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Recognizer warm-up failed: {e}");
                    Err(e.into())
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Step back one question. A no-op on the first question or once done.
    pub fn previous_question(&mut self) -> Navigation {
        if self.done || self.index == 0 {
            tracing::debug!("Already at the first question");
            return Navigation::Ignored;
        }
        self.index -= 1;
        self.reset_question_state();
        Navigation::Moved
    }

    /// Step forward one question, or finish the session from the last one.
    pub fn next_question(&mut self) -> Navigation {
        if self.done {
            return Navigation::Ignored;
        }
        if self.index + 1 < self.order.len() {
            self.index += 1;
            self.reset_question_state();
            Navigation::Moved
        } else {
            self.done = true;
            tracing::info!("Session finished after {} questions", self.order.len());
            Navigation::Finished
        }
    }

    /// Go back to the first question, reshuffling if randomization is on.
    pub fn restart(&mut self) {
        if self.randomize {
            self.shuffle();
        }
        self.index = 0;
        self.done = false;
        self.reset_question_state();
        tracing::info!("Session restarted");
    }

    fn reset_question_state(&mut self) {
        self.hint_visible = false;
        self.answer = AnswerState::Unanswered;
        self.raster = None;
        self.commands.push(SurfaceCommand::RequestClear);
        tracing::debug!(
            "Now asking question {}/{}: {}",
            self.index + 1,
            self.order.len(),
            self.current_question().prompt()
        );
    }

    // ------------------------------------------------------------------
    // Hints
    // ------------------------------------------------------------------

    /// Flip hint visibility.
    pub fn toggle_hint(&mut self) {
        self.hint_visible = !self.hint_visible;
    }

    /// Make the hint visible.
    pub fn show_hint(&mut self) {
        self.hint_visible = true;
    }

    /// Whether the hint is shown.
    #[must_use]
    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    // ------------------------------------------------------------------
    // Surface hand-off
    // ------------------------------------------------------------------

    /// Take in a raster emitted by the canvas surface.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        self.raster = Some(event.into_raster());
    }

    /// Latest raster from the surface, if any since the question changed.
    #[must_use]
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Commands queued for the canvas surface since the last drain.
    pub fn drain_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    // ------------------------------------------------------------------
    // Checking
    // ------------------------------------------------------------------

    /// Start checking the current drawing.
    ///
    /// A check whose recognition failed may be started again (a retry).
    ///
    /// # Errors
    ///
    /// - [`DrillError::NotReady`] if no surface has delivered a raster yet
    ///   or the recognizer is not ready.
    /// - [`DrillError::Busy`] if a recognition is already outstanding.
    pub fn begin_check<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &R,
    ) -> DrillResult<CheckRequest> {
        let Some(raster) = self.raster.clone() else {
            tracing::warn!("Check rejected: drawing surface not ready");
            return Err(DrillError::NotReady(
                "drawing surface has not produced an image".to_string(),
            ));
        };
        if !recognizer.is_ready() {
            tracing::warn!("Check rejected: recognizer not ready");
            return Err(DrillError::NotReady("recognizer is not ready".to_string()));
        }
        if let AnswerState::Checking { failure: None, .. } = self.answer {
            tracing::warn!("Check rejected: recognition already in progress");
            return Err(DrillError::Busy);
        }

        let ticket = CheckTicket(self.next_ticket);
        self.next_ticket += 1;
        self.answer = AnswerState::Checking {
            ticket,
            progress: None,
            failure: None,
        };
        tracing::debug!("Check {} started", ticket.id());

        Ok(CheckRequest {
            ticket,
            raster,
            config: self.catalog.recognizer_config(),
        })
    }

    /// Record a progress notification.
    ///
    /// Returns `false` (and ignores it) if the ticket is stale or the fraction
    /// went backwards.
    pub fn report_progress(&mut self, ticket: CheckTicket, update: Progress) -> bool {
        match &mut self.answer {
            AnswerState::Checking {
                ticket: current,
                progress,
                failure: None,
            } if *current == ticket => {
                if progress
                    .as_ref()
                    .is_some_and(|last| update.fraction < last.fraction)
                {
                    tracing::debug!("Dropping out-of-order progress {}", update.fraction);
                    return false;
                }
                *progress = Some(update);
                true
            }
            _ => false,
        }
    }

    /// Grade the result of a recognition.
    ///
    /// # Errors
    ///
    /// - [`DrillError::StaleResult`] if the ticket is not the outstanding one;
    ///   the state is left untouched.
    /// - [`DrillError::Recognizer`] if the recognizer failed; the question
    ///   stays in `Checking` until retried or cancelled.
    pub fn complete_check(
        &mut self,
        ticket: CheckTicket,
        result: Result<Recognition, RecognizerError>,
    ) -> DrillResult<CheckOutcome> {
        let progress = match &self.answer {
            AnswerState::Checking {
                ticket: current,
                progress,
                failure: None,
            } if *current == ticket => progress.clone(),
            _ => {
                tracing::debug!("Discarding stale result for check {}", ticket.id());
                return Err(DrillError::StaleResult(ticket.id()));
            }
        };

        let recognition = match result {
            Ok(recognition) => recognition,
            Err(e) => {
                tracing::warn!("Check {} failed: {e}", ticket.id());
                self.answer = AnswerState::Checking {
                    ticket,
                    progress,
                    failure: Some(e.clone()),
                };
                return Err(e.into());
            }
        };

        let recognized = strip_whitespace(&recognition.text);
        let grade = if self.current_question().accepts(&recognized) {
            Grade::Correct
        } else {
            Grade::Incorrect
        };
        let outcome = CheckOutcome {
            recognized,
            grade,
            confidence: recognition.confidence,
        };
        tracing::info!(
            "Check {}: read '{}' ({:.0}%) -> {:?}",
            ticket.id(),
            outcome.recognized,
            outcome.confidence,
            grade
        );
        self.answer = AnswerState::Graded(outcome.clone());
        Ok(outcome)
    }

    /// Abandon the outstanding (or failed) recognition.
    ///
    /// # Errors
    ///
    /// Returns [`DrillError::NotChecking`] if nothing is outstanding.
    pub fn cancel_check(&mut self) -> DrillResult<()> {
        if matches!(self.answer, AnswerState::Checking { .. }) {
            self.answer = AnswerState::Unanswered;
            tracing::debug!("Check cancelled");
            Ok(())
        } else {
            Err(DrillError::NotChecking)
        }
    }

    /// Recognise and grade the current drawing in one go.
    ///
    /// # Errors
    ///
    /// Any error from [`Session::begin_check`] or [`Session::complete_check`].
    pub async fn check_answer<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &R,
    ) -> DrillResult<CheckOutcome> {
        let request = self.begin_check(recognizer)?;
        let ticket = request.ticket;
        let result = recognizer
            .recognize(&request.raster, &request.config, &mut |p| {
                self.report_progress(ticket, p);
            })
            .await;
        self.complete_check(ticket, result)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The question being asked.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.catalog.questions()[self.order[self.index]]
    }

    /// Position in the question order.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Catalog indices in asking order.
    #[must_use]
    pub fn question_order(&self) -> &[usize] {
        &self.order
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false`: catalogs are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the learner stepped past the last question.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether the order is reshuffled on restart.
    #[must_use]
    pub fn randomize(&self) -> bool {
        self.randomize
    }

    /// Answer state of the current question.
    #[must_use]
    pub fn answer_state(&self) -> &AnswerState {
        &self.answer
    }

    /// `None` until graded, then whether the answer was accepted.
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        match &self.answer {
            AnswerState::Graded(outcome) => Some(outcome.is_correct()),
            _ => None,
        }
    }

    /// The catalog being drilled.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Snapshot for rendering a UI.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let question = self.current_question();
        let mut view = SessionView {
            prompt: question.prompt().to_string(),
            hint: self.hint_visible.then(|| question.hint().to_string()),
            index: self.index,
            total: self.order.len(),
            done: self.done,
            checking: false,
            status: None,
            progress_percent: 0.0,
            failure: None,
            recognized: String::new(),
            correct: None,
            confidence: 0.0,
            band: None,
        };
        match &self.answer {
            AnswerState::Unanswered => {}
            AnswerState::Checking {
                progress, failure, ..
            } => {
                view.checking = failure.is_none();
                if let Some(progress) = progress {
                    view.status = Some(progress.status.clone());
                    view.progress_percent = progress.percent();
                }
                view.failure = failure.as_ref().map(ToString::to_string);
            }
            AnswerState::Graded(outcome) => {
                view.recognized.clone_from(&outcome.recognized);
                view.correct = Some(outcome.is_correct());
                view.confidence = outcome.confidence;
                view.band = Some(outcome.band());
            }
        }
        view
    }
}

/// Remove every whitespace character, ideographic space included.
#[must_use]
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
