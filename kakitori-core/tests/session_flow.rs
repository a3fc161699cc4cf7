//! Session Flow Integration Tests
//!
//! Tests a drill end to end:
//! - Navigation across a whole catalog
//! - Restart with and without shuffling
//! - Recognise-and-grade through the async check
//! - Built-in catalogs and launch configuration

use kakitori_core::{
    AnswerState, Catalog, ConfidenceBand, DrillError, FixedRecognizer, LaunchConfig, Navigation,
    Question, Raster, RecognizerError, Rgba, Script, Session, SurfaceCommand, SurfaceEvent,
};

/// A catalog of `n` numbered questions.
fn numbered_catalog(n: usize) -> Catalog {
    let questions = (0..n)
        .map(|i| Question::new(format!("prompt {i}"), [format!("answer {i}")], ""))
        .collect();
    Catalog::new("jpn", "", questions).expect("catalog")
}

/// Hand the session a blank drawing.
fn draw_something(session: &mut Session) {
    session.handle_surface_event(SurfaceEvent::StrokeCommitted(Raster::filled(
        50,
        20,
        Rgba::WHITE,
    )));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_walks_to_last_question_then_finishes() {
    let n = 6;
    let mut session = Session::new(numbered_catalog(n), false);

    for _ in 0..n - 1 {
        assert_eq!(session.next_question(), Navigation::Moved);
    }
    assert_eq!(session.current_index(), n - 1);
    assert!(!session.is_done());

    assert_eq!(session.next_question(), Navigation::Finished);
    assert!(session.is_done());
    assert_eq!(session.current_index(), n - 1);
}

#[test]
fn test_restart_without_randomize_keeps_identity_order() {
    let mut session = Session::new(numbered_catalog(3), false);
    let _ = session.next_question();
    let _ = session.next_question();
    session.restart();

    assert_eq!(session.current_index(), 0);
    assert!(!session.is_done());
    assert_eq!(session.question_order(), [0, 1, 2]);
}

#[test]
fn test_restart_leaves_done_state() {
    let mut session = Session::new(numbered_catalog(2), false);
    let _ = session.next_question();
    let _ = session.next_question();
    assert!(session.is_done());

    session.restart();
    assert!(!session.is_done());
    assert_eq!(session.next_question(), Navigation::Moved);
}

#[test]
fn test_restart_with_randomize_keeps_a_permutation() {
    let mut session = Session::with_seed(numbered_catalog(21), true, 99);
    for _ in 0..5 {
        session.restart();
        let mut order = session.question_order().to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..21).collect::<Vec<_>>());
    }
}

#[test]
fn test_every_move_requests_a_clear() {
    let mut session = Session::new(numbered_catalog(3), false);
    let _ = session.next_question();
    let _ = session.previous_question();
    let _ = session.previous_question(); // ignored
    session.restart();

    let commands = session.drain_commands();
    assert_eq!(commands, vec![SurfaceCommand::RequestClear; 3]);
}

// ============================================================================
// Checking
// ============================================================================

#[tokio::test]
async fn test_spaced_reading_matches_kana_answer() {
    let catalog = Catalog::new(
        "jpn",
        "一いち",
        vec![Question::new("one", ["一", "いち"], "ichi")],
    )
    .expect("catalog");
    let mut session = Session::new(catalog, false);
    draw_something(&mut session);

    let outcome = session
        .check_answer(&FixedRecognizer::new(" いち ", 91.0))
        .await
        .expect("check");

    assert_eq!(outcome.recognized, "いち");
    assert!(outcome.is_correct());
    assert_eq!(outcome.band(), ConfidenceBand::High);
    assert_eq!(session.is_correct(), Some(true));
}

#[tokio::test]
async fn test_unmatched_reading_is_incorrect() {
    let mut session = Session::new(Catalog::builtin(Script::Hiragana), false);
    draw_something(&mut session);

    let outcome = session
        .check_answer(&FixedRecognizer::new("に ほ", 30.0))
        .await
        .expect("check");

    assert!(!outcome.is_correct());
    assert_eq!(outcome.band(), ConfidenceBand::Low);
    let view = session.view();
    assert_eq!(view.correct, Some(false));
    assert_eq!(view.recognized, "にほ");
    assert_eq!(view.band, Some(ConfidenceBand::Low));
}

#[tokio::test]
async fn test_every_builtin_answer_grades_correct() {
    for script in [Script::Hiragana, Script::Katakana] {
        let mut session = Session::new(Catalog::builtin(script), false);
        loop {
            let answers = session.current_question().answers().to_vec();
            for answer in answers {
                draw_something(&mut session);
                let outcome = session
                    .check_answer(&FixedRecognizer::new(answer.clone(), 80.0))
                    .await
                    .expect("check");
                assert!(outcome.is_correct(), "{answer} should be accepted");
            }
            if session.next_question() == Navigation::Finished {
                break;
            }
        }
    }
}

#[tokio::test]
async fn test_navigation_resets_grade_and_requires_new_drawing() {
    let mut session = Session::new(numbered_catalog(2), false);
    draw_something(&mut session);
    let _ = session
        .check_answer(&FixedRecognizer::new("answer 0", 70.0))
        .await
        .expect("check");
    assert_eq!(session.is_correct(), Some(true));

    let _ = session.next_question();
    assert_eq!(session.is_correct(), None);
    assert_eq!(session.answer_state(), &AnswerState::Unanswered);

    let err = session
        .check_answer(&FixedRecognizer::new("answer 1", 70.0))
        .await
        .expect_err("no raster after navigation");
    assert!(matches!(err, DrillError::NotReady(_)));
}

#[tokio::test]
async fn test_failed_recognition_can_be_retried() {
    let mut session = Session::new(numbered_catalog(1), false);
    draw_something(&mut session);

    let err = session
        .check_answer(&FixedRecognizer::failing(RecognizerError::Failed(
            "worker crashed".to_string(),
        )))
        .await
        .expect_err("failure");
    assert!(matches!(err, DrillError::Recognizer(_)));
    assert!(session.view().failure.is_some());

    let outcome = session
        .check_answer(&FixedRecognizer::new("answer 0", 55.0))
        .await
        .expect("retry");
    assert!(outcome.is_correct());
    assert!(session.view().failure.is_none());
}

#[tokio::test]
async fn test_warm_up_is_optional() {
    let session = Session::new(numbered_catalog(1), false);
    session
        .warm_up(&FixedRecognizer::new("", 0.0))
        .await
        .expect("warm up");
}

#[tokio::test]
async fn test_warm_up_does_not_hold_the_session() {
    let recognizer = FixedRecognizer::new("", 0.0);
    let mut session = Session::new(numbered_catalog(2), false);
    let warm_up = session.warm_up(&recognizer);
    assert_eq!(session.next_question(), Navigation::Moved);
    warm_up.await.expect("warm up");
    assert_eq!(session.current_index(), 1);
}

// ============================================================================
// Launch configuration
// ============================================================================

#[test]
fn test_query_string_selects_katakana_catalog() {
    let config = LaunchConfig::from_query("?katakana");
    let session = Session::from_config(&config);
    assert_eq!(session.len(), 4);
    assert_eq!(session.current_question().prompt(), "ice cream");
    assert!(!session
        .catalog()
        .recognizer_config()
        .char_whitelist
        .contains('日'));
}

#[test]
fn test_default_launch_uses_hiragana_catalog_in_order() {
    let session = Session::from_config(&LaunchConfig::default());
    assert_eq!(session.len(), 21);
    assert_eq!(session.current_question().prompt(), "Japan");
    assert_eq!(session.question_order(), (0..21).collect::<Vec<_>>());
}
