use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{AnswerRecord, Question, ScoreId, ScoreRecord, UserIdentity, answer_index};
use quiz_core::scoring::percentage;

use crate::sessions::SessionState;

/// Frozen grading snapshot for one question of a finished session.
///
/// Indices refer to `displayed_options`, never to `question.options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub question: Question,
    #[serde(with = "answer_index")]
    pub user_answer: Option<usize>,
    #[serde(with = "answer_index")]
    pub correct_answer: Option<usize>,
    pub is_correct: bool,
    pub displayed_options: Vec<String>,
    #[serde(with = "answer_index")]
    pub correct_display_index: Option<usize>,
}

impl ResultRecord {
    /// The user's answer with `-1` standing in for "unanswered".
    #[must_use]
    pub fn user_answer_or_sentinel(&self) -> i64 {
        self.user_answer
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(answer_index::SENTINEL)
    }

    #[must_use]
    pub fn answer_record(&self) -> AnswerRecord {
        AnswerRecord {
            question_id: self.question.id.clone(),
            user_answer: self.user_answer,
            correct_answer: self.correct_answer,
            is_correct: self.is_correct,
        }
    }
}

/// Zip questions, answers and correct display indices into result records.
#[must_use]
pub fn session_results(state: &SessionState) -> Vec<ResultRecord> {
    state
        .questions()
        .iter()
        .zip(state.selected_answers())
        .map(|(q, &user_answer)| ResultRecord {
            question: q.question.clone(),
            user_answer,
            correct_answer: q.correct_display_index(),
            is_correct: q.display.is_correct(user_answer),
            displayed_options: q.displayed_options().to_vec(),
            correct_display_index: q.correct_display_index(),
        })
        .collect()
}

/// Correct answers among `results`.
#[must_use]
pub fn running_score(results: &[ResultRecord]) -> usize {
    results.iter().filter(|r| r.is_correct).count()
}

/// Build the persisted record for `state`, stamped with `identity` and `at`.
#[must_use]
pub fn compile_score_record(
    state: &SessionState,
    identity: &UserIdentity,
    at: DateTime<Utc>,
) -> ScoreRecord {
    let results = session_results(state);
    let score = u32::try_from(running_score(&results)).unwrap_or(u32::MAX);
    let total_questions = u32::try_from(results.len()).unwrap_or(u32::MAX);
    let scope = state.scope();

    ScoreRecord {
        id: ScoreId::generate(),
        user_id: identity.id.clone(),
        user_name: identity.name.clone(),
        session_id: scope.id.clone(),
        session_name: scope.name.clone(),
        score,
        total_questions,
        percentage: percentage(score, total_questions),
        timestamp: at,
        mode: scope.mode,
        answers: results.iter().map(ResultRecord::answer_record).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::{SessionBuilder, SessionEvent, SessionPool, SessionSettings};
    use quiz_core::model::{QuizCategory, SessionMode, UserId};
    use quiz_core::sampler::ScriptedSource;
    use quiz_core::time::fixed_now;

    fn state() -> SessionState {
        let cat = QuizCategory::new(
            "adab",
            "Adab",
            vec![
                Question::new("q1", "One", vec!["a".into(), "b".into(), "c".into()], 0),
                Question::new("q2", "Two", vec!["a".into(), "b".into()], 1),
                Question::new("q3", "Three", vec!["a".into(), "b".into(), "c".into()], 2),
            ],
        );
        let plan = SessionBuilder::new(&SessionSettings::default())
            .build(SessionPool::Category(&cat), &mut ScriptedSource::identity())
            .unwrap();
        SessionState::from_plan(plan, fixed_now()).unwrap()
    }

    fn identity() -> UserIdentity {
        UserIdentity {
            id: UserId::new("user_1"),
            name: "Ali".into(),
        }
    }

    #[test]
    fn results_grade_against_display_index() {
        let mut s = state();
        let c = s.current_question().correct_display_index();
        s.apply(SessionEvent::SelectAnswer(c.unwrap()));
        s.apply(SessionEvent::Next);
        let c = s.current_question().correct_display_index().unwrap();
        s.apply(SessionEvent::SelectAnswer((c + 1) % 2));

        let results = session_results(&s);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_correct);
        assert!(!results[1].is_correct);
        assert!(!results[2].is_correct);
        assert_eq!(results[2].user_answer, None);
        assert_eq!(results[2].user_answer_or_sentinel(), -1);
        assert_eq!(running_score(&results), s.score());
        for r in &results {
            let idx = r.correct_display_index.unwrap();
            assert_eq!(
                Some(r.displayed_options[idx].as_str()),
                r.question.correct_option()
            );
        }
    }

    #[test]
    fn compiled_record_is_valid() {
        let mut s = state();
        let c = s.current_question().correct_display_index().unwrap();
        s.apply(SessionEvent::SelectAnswer(c));

        let record = compile_score_record(&s, &identity(), fixed_now());
        assert!(record.validate().is_ok());
        assert_eq!(record.score, 1);
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.percentage, 33);
        assert_eq!(record.session_id.as_str(), "adab");
        assert_eq!(record.session_name, "Adab");
        assert_eq!(record.mode, SessionMode::Quiz);
        assert_eq!(record.user_name, "Ali");
        assert!(record.id.as_str().starts_with("score_"));
        assert_eq!(record.answers[1].user_answer, None);
        assert_eq!(record.answers[0].question_id.as_str(), "q1");
    }

    #[test]
    fn sentinel_appears_when_serialized() {
        let results = session_results(&state());
        let json = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(json["userAnswer"], -1);
        assert!(json["displayedOptions"].is_array());
    }
}
