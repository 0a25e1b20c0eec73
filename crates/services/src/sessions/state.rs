use chrono::{DateTime, Utc};

use quiz_core::time::elapsed_seconds;

use super::plan::{SessionPlan, SessionQuestion, SessionScope};

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Everything that can happen to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Answer the current question with a displayed-option index.
    SelectAnswer(usize),
    Next,
    Previous,
    Finish { at: DateTime<Utc> },
}

/// Coarse lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Complete,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// A live session: frozen questions plus one answer slot per question.
///
/// Only the answer slots, the cursor and the end time ever change. Every
/// flag the UI reads (`is_answered`, `is_complete`, `progress`, ...) is
/// derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    scope: SessionScope,
    questions: Vec<SessionQuestion>,
    selected_answers: Vec<Option<usize>>,
    current_index: usize,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Start a session from a non-empty plan. Returns `None` for an empty one.
    #[must_use]
    pub fn from_plan(plan: SessionPlan, started_at: DateTime<Utc>) -> Option<Self> {
        if plan.questions.is_empty() {
            return None;
        }
        let selected_answers = vec![None; plan.questions.len()];
        Some(Self {
            scope: plan.scope,
            questions: plan.questions,
            selected_answers,
            current_index: 0,
            started_at,
            ended_at: None,
        })
    }

    #[must_use]
    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected_answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> &SessionQuestion {
        &self.questions[self.current_index]
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected_answers[self.current_index].is_some()
    }

    /// Same as `is_answered`: an answer is revealed the moment it is given.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.is_answered()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selected_answers.iter().filter(|a| a.is_some()).count()
    }

    /// Correct answers so far. Valid mid-session and after finishing.
    #[must_use]
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.selected_answers)
            .filter(|(q, answer)| q.display.is_correct(**answer))
            .count()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    /// At the last question and it has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_last() && self.is_answered()
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        !self.is_last()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.current_index > 0
    }

    /// `(current_index + 1) / total_questions`, in `(0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        (self.current_index + 1) as f64 / self.questions.len() as f64
    }

    /// Seconds from start to the end time, or to `now` while still running.
    #[must_use]
    pub fn time_spent_seconds(&self, now: DateTime<Utc>) -> u64 {
        elapsed_seconds(self.started_at, self.ended_at.unwrap_or(now))
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_complete() {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress
        }
    }

    /// Apply one event in place. Events that make no sense in the current
    /// state are ignored.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SelectAnswer(index) => {
                if self.ended_at.is_some() {
                    return;
                }
                let slot = &mut self.selected_answers[self.current_index];
                if slot.is_none() {
                    *slot = Some(index);
                }
            }
            SessionEvent::Next => {
                if self.can_go_next() {
                    self.current_index += 1;
                }
            }
            SessionEvent::Previous => {
                if self.can_go_previous() {
                    self.current_index -= 1;
                }
            }
            SessionEvent::Finish { at } => {
                if self.ended_at.is_none() {
                    self.ended_at = Some(at);
                }
            }
        }
    }
}

/// Pure transition: `(state, event) -> state`.
#[must_use]
pub fn reduce(mut state: SessionState, event: SessionEvent) -> SessionState {
    state.apply(event);
    state
}
