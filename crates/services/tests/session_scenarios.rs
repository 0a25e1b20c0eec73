use std::collections::HashSet;

use quiz_core::model::{Question, QuizCategory};
use quiz_core::sampler::{RngSource, ScriptedSource};
use quiz_core::time::fixed_clock;
use services::{SessionEngine, SessionError, SessionPhase, SessionSettings};

fn three_question_category() -> QuizCategory {
    QuizCategory::new(
        "adab",
        "Adab",
        vec![
            Question::new(
                "q1",
                "Q1",
                vec!["a1".into(), "b1".into(), "c1".into(), "d1".into()],
                0,
            ),
            Question::new("q2", "Q2", vec!["a2".into(), "b2".into()], 1),
            Question::new(
                "q3",
                "Q3",
                vec![
                    "a3".into(),
                    "b3".into(),
                    "c3".into(),
                    "d3".into(),
                    "e3".into(),
                ],
                2,
            ),
        ],
    )
}

fn category(id: &str, n: usize) -> QuizCategory {
    QuizCategory::new(
        id,
        id.to_uppercase(),
        (0..n)
            .map(|i| {
                Question::new(
                    format!("{id}-{i}"),
                    format!("{id} question {i}"),
                    (0..7).map(|o| format!("{id}-{i}-{o}")).collect(),
                    (i * 3) % 7,
                )
            })
            .collect(),
    )
}

fn engine(seed: u64) -> SessionEngine {
    SessionEngine::with_rng(SessionSettings::default(), fixed_clock(), RngSource::seeded(seed))
}

#[test]
fn three_question_quiz_walkthrough() {
    let cat = three_question_category();
    let mut e = engine(7);
    e.start_quiz(&cat).unwrap();
    assert_eq!(e.total_questions(), 3);

    let correct = e.current_question().unwrap().correct_display_index().unwrap();
    e.select_answer(correct);
    assert_eq!(e.score(), 1);

    let other = (correct + 1) % e.current_question().unwrap().displayed_options().len();
    e.select_answer(other);
    assert_eq!(e.selected_answers()[0], Some(correct));
    assert_eq!(e.score(), 1);

    e.go_to_next();
    e.go_to_next();
    assert_eq!(e.current_question_index(), 2);
    assert!(!e.is_complete());

    let results = e.finish_session().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_correct);
    for r in &results[1..] {
        assert_eq!(r.user_answer, None);
        assert_eq!(r.user_answer_or_sentinel(), -1);
        assert!(!r.is_correct);
    }
    assert_eq!(results.iter().filter(|r| r.is_correct).count(), e.score());
}

#[test]
fn empty_category_cannot_start() {
    let mut e = engine(1);
    let err = e.start_quiz(&category("empty", 0)).unwrap_err();
    assert!(matches!(err, SessionError::NoQuestionsAvailable));

    let err = e
        .start_test(&[category("a", 0), category("b", 0)])
        .unwrap_err();
    assert!(matches!(err, SessionError::NoQuestionsAvailable));
    assert_eq!(e.phase(), SessionPhase::Idle);
}

#[test]
fn quiz_and_test_sizes() {
    let mut e = engine(2);
    assert_eq!(e.start_quiz(&category("big", 40)).unwrap().total_questions(), 10);
    assert_eq!(e.start_quiz(&category("small", 6)).unwrap().total_questions(), 6);

    let many = vec![category("a", 15), category("b", 15), category("c", 15)];
    let state = e.start_test(&many).unwrap();
    assert_eq!(state.total_questions(), 30);
    let ids: HashSet<_> = state.questions().iter().map(|q| &q.question.id).collect();
    assert_eq!(ids.len(), 30);

    let few = vec![category("a", 10), category("b", 10)];
    assert_eq!(e.start_test(&few).unwrap().total_questions(), 20);
}

#[test]
fn every_displayed_set_points_at_the_right_text() {
    let many = vec![category("a", 15), category("b", 15)];
    for seed in 0..20 {
        let mut e = engine(seed);
        let state = e.start_test(&many).unwrap();
        for q in state.questions() {
            let idx = q.correct_display_index().unwrap();
            assert_eq!(
                Some(q.displayed_options()[idx].as_str()),
                q.question.correct_option()
            );
            assert_eq!(q.displayed_options().len(), 4);
        }
    }
}

#[test]
fn completion_predicate_over_a_full_run() {
    let mut e = SessionEngine::with_rng(
        SessionSettings::default(),
        fixed_clock(),
        ScriptedSource::identity(),
    );
    e.start_quiz(&category("c", 4)).unwrap();

    for i in 0..4 {
        assert!(!e.is_complete());
        e.select_answer(0);
        if i < 3 {
            assert!(!e.is_complete());
            e.go_to_next();
        }
    }
    assert!(e.is_complete());
    assert_eq!(e.phase(), SessionPhase::Complete);
    assert!(!e.can_go_next());
    assert!(e.can_go_previous());

    let mid = e.score();
    let results = e.finish_session().unwrap();
    assert_eq!(results.iter().filter(|r| r.is_correct).count(), mid);
}

#[test]
fn navigation_bounds_leave_state_untouched() {
    let mut e = engine(3);
    e.start_quiz(&category("n", 2)).unwrap();
    let before = e.state().cloned();
    e.go_to_previous();
    assert_eq!(e.state().cloned(), before);

    e.go_to_next();
    let at_end = e.state().cloned();
    e.go_to_next();
    assert_eq!(e.state().cloned(), at_end);
    assert_eq!(e.progress(), Some(1.0));
}
