use quiz_core::model::{ScoreRecord, UserIdentity};
use quiz_core::sampler::{OsRngSource, RandomSource};
use tracing::warn;

use crate::error::SessionError;
use crate::scores::{ResultRecord, ScoreService, compile_score_record};
use crate::sessions::SessionEngine;

/// What a finished session produced, saved or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub results: Vec<ResultRecord>,
    pub record: ScoreRecord,
    /// `false` when the score could not be persisted. Results stay valid.
    pub saved: bool,
}

impl SessionOutcome {
    #[must_use]
    pub fn score(&self) -> u32 {
        self.record.score
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.record.percentage
    }
}

/// Couples a session engine with score persistence.
pub struct QuizWorkflow<R: RandomSource = OsRngSource> {
    engine: SessionEngine<R>,
    scores: ScoreService,
}

impl<R: RandomSource> QuizWorkflow<R> {
    #[must_use]
    pub fn new(engine: SessionEngine<R>, scores: ScoreService) -> Self {
        Self { engine, scores }
    }

    #[must_use]
    pub fn engine(&self) -> &SessionEngine<R> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SessionEngine<R> {
        &mut self.engine
    }

    #[must_use]
    pub fn scores(&self) -> &ScoreService {
        &self.scores
    }

    /// Finish the running session, compile its score record for `identity`
    /// and try to save it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionNotStarted` if no session is running.
    pub async fn complete(&mut self, identity: &UserIdentity) -> Result<SessionOutcome, SessionError> {
        let results = self.engine.finish_session()?;
        let state = self.engine.state().ok_or(SessionError::SessionNotStarted)?;
        let at = state.ended_at().unwrap_or_else(|| self.engine.clock().now());
        let record = compile_score_record(state, identity, at);

        let saved = self.scores.save_score(&record).await;
        if !saved {
            warn!(session_id = %record.session_id, "score not saved; showing results anyway");
        }
        Ok(SessionOutcome {
            results,
            record,
            saved,
        })
    }
}
