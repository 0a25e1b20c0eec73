use quiz_core::Clock;
use quiz_core::model::QuizCategory;
use quiz_core::sampler::{OsRngSource, RandomSource};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::scores::{ResultRecord, session_results};

use super::plan::{SessionBuilder, SessionPool, SessionQuestion, SessionSettings};
use super::state::{SessionEvent, SessionPhase, SessionState};
use super::view::SessionView;

/// Drives one Quiz or Test session at a time.
///
/// Owns the clock and the random source so tests can pin both. Starting a new
/// session discards the previous one.
pub struct SessionEngine<R: RandomSource = OsRngSource> {
    settings: SessionSettings,
    clock: Clock,
    rng: R,
    state: Option<SessionState>,
}

impl SessionEngine {
    /// Engine backed by an OS-seeded generator.
    #[must_use]
    pub fn new(settings: SessionSettings, clock: Clock) -> Self {
        Self::with_rng(settings, clock, OsRngSource::from_os())
    }
}

impl<R: RandomSource> SessionEngine<R> {
    #[must_use]
    pub fn with_rng(settings: SessionSettings, clock: Clock, rng: R) -> Self {
        Self {
            settings,
            clock,
            rng,
            state: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access for tests that simulate time passing.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    //
    // ─── WRITE MODEL ───────────────────────────────────────────────────────────
    //

    /// Sample questions from `pool`, freeze their options and start at question 0.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestionsAvailable` if the pool is empty.
    /// Returns `SessionError::Options` for a question with an invalid correct index.
    pub fn start_session(&mut self, pool: SessionPool<'_>) -> Result<&SessionState, SessionError> {
        self.state = None;
        let plan = SessionBuilder::new(&self.settings).build(pool, &mut self.rng)?;
        let started_at = self.clock.now();
        let state =
            SessionState::from_plan(plan, started_at).ok_or(SessionError::NoQuestionsAvailable)?;

        info!(
            session_id = %state.scope().id,
            mode = %state.scope().mode,
            questions = state.total_questions(),
            "session started"
        );
        Ok(&*self.state.insert(state))
    }

    /// Quiz mode over a single category.
    ///
    /// # Errors
    ///
    /// See [`Self::start_session`].
    pub fn start_quiz(&mut self, category: &QuizCategory) -> Result<&SessionState, SessionError> {
        self.start_session(SessionPool::Category(category))
    }

    /// Test mode over every category.
    ///
    /// # Errors
    ///
    /// See [`Self::start_session`].
    pub fn start_test(
        &mut self,
        categories: &[QuizCategory],
    ) -> Result<&SessionState, SessionError> {
        self.start_session(SessionPool::AllCategories(categories))
    }

    /// Answer the current question. Ignored if it is already answered or no
    /// session is running.
    ///
    /// Answers are also locked once [`Self::finish_session`] has run, so the
    /// running score always matches the results that were handed out.
    pub fn select_answer(&mut self, index: usize) {
        if let Some(state) = self.state.as_mut() {
            let locked = state.is_answered() || state.is_finished();
            state.apply(SessionEvent::SelectAnswer(index));
            if locked {
                debug!(index, "answer already locked; ignoring");
            } else {
                debug!(
                    question = state.current_index(),
                    index,
                    correct = state.current_question().display.is_correct(Some(index)),
                    "answer selected"
                );
            }
        }
    }

    pub fn go_to_next(&mut self) {
        self.dispatch(SessionEvent::Next);
    }

    pub fn go_to_previous(&mut self) {
        self.dispatch(SessionEvent::Previous);
    }

    /// Stamp the end time and return the graded results. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionNotStarted` if no session is running.
    pub fn finish_session(&mut self) -> Result<Vec<ResultRecord>, SessionError> {
        let at = self.clock.now();
        let state = self.state.as_mut().ok_or(SessionError::SessionNotStarted)?;
        state.apply(SessionEvent::Finish { at });

        let results = session_results(state);
        info!(
            session_id = %state.scope().id,
            score = state.score(),
            total = state.total_questions(),
            seconds = state.time_spent_seconds(at),
            "session finished"
        );
        Ok(results)
    }

    /// Drop the current session and return to idle.
    pub fn reset_session(&mut self) {
        if self.state.take().is_some() {
            debug!("session reset");
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        if let Some(state) = self.state.as_mut() {
            state.apply(event);
        }
    }

    //
    // ─── READ MODEL ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state
            .as_ref()
            .map_or(SessionPhase::Idle, SessionState::phase)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&SessionQuestion> {
        self.state.as_ref().map(SessionState::current_question)
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.state.as_ref().map_or(0, SessionState::current_index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.state.as_ref().map_or(0, SessionState::total_questions)
    }

    #[must_use]
    pub fn selected_answers(&self) -> &[Option<usize>] {
        self.state
            .as_ref()
            .map(SessionState::selected_answers)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::is_answered)
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::is_revealed)
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.state.as_ref().map_or(0, SessionState::score)
    }

    /// `None` while idle.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.state.as_ref().map(SessionState::progress)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::is_complete)
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::can_go_next)
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::can_go_previous)
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u64 {
        let now = self.clock.now();
        self.state
            .as_ref()
            .map_or(0, |s| s.time_spent_seconds(now))
    }

    /// Snapshot for the UI; `None` while idle.
    #[must_use]
    pub fn view(&self) -> Option<SessionView<'_>> {
        let now = self.clock.now();
        self.state
            .as_ref()
            .map(|s| SessionView::from_state(s, s.time_spent_seconds(now)))
    }
}
