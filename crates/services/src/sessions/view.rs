use serde::Serialize;

use quiz_core::model::{SessionId, SessionMode};

use super::plan::SessionQuestion;
use super::state::SessionState;

/// Read-only snapshot of a running session for presentation layers.
///
/// Carries no formatting; `progress` stays a ratio and times stay in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<'a> {
    pub session_id: &'a SessionId,
    pub session_name: &'a str,
    pub mode: SessionMode,
    pub question_id: &'a str,
    pub question_text: &'a str,
    pub displayed_options: &'a [String],
    /// Only exposed once the current question is revealed.
    pub correct_display_index: Option<usize>,
    pub current_question_index: usize,
    pub total_questions: usize,
    pub selected_answers: &'a [Option<usize>],
    pub answered: bool,
    pub revealed: bool,
    pub score: usize,
    pub progress: f64,
    pub is_complete: bool,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub time_spent_seconds: u64,
}

impl<'a> SessionView<'a> {
    #[must_use]
    pub fn from_state(state: &'a SessionState, time_spent_seconds: u64) -> Self {
        let scope = state.scope();
        let current: &SessionQuestion = state.current_question();
        let revealed = state.is_revealed();
        Self {
            session_id: &scope.id,
            session_name: &scope.name,
            mode: scope.mode,
            question_id: current.question.id.as_str(),
            question_text: &current.question.text,
            displayed_options: current.displayed_options(),
            correct_display_index: if revealed {
                current.correct_display_index()
            } else {
                None
            },
            current_question_index: state.current_index(),
            total_questions: state.total_questions(),
            selected_answers: state.selected_answers(),
            answered: state.is_answered(),
            revealed,
            score: state.score(),
            progress: state.progress(),
            is_complete: state.is_complete(),
            can_go_next: state.can_go_next(),
            can_go_previous: state.can_go_previous(),
            time_spent_seconds,
        }
    }

    /// The answer given for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.selected_answers
            .get(self.current_question_index)
            .copied()
            .flatten()
    }
}
