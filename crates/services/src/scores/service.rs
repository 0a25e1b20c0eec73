use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, ScoreRecord, SessionId};
use quiz_core::scoring::{self, ScoreStats};
use storage::repository::ScoreRepository;
use tracing::{info, warn};

use crate::error::ScoreServiceError;

/// Saves finished sessions and answers leaderboard/statistics queries.
#[derive(Clone)]
pub struct ScoreService {
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreService {
    #[must_use]
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(storage::repository::InMemoryRepository::new()))
    }

    /// Validate and append a record.
    ///
    /// Returns `false` (and logs why) when the record is structurally invalid
    /// or storage fails. Never errors: callers keep showing results either way.
    pub async fn save_score(&self, record: &ScoreRecord) -> bool {
        if let Err(err) = record.validate() {
            warn!(score_id = %record.id, error = %err, "rejected invalid score record");
            return false;
        }
        match self.scores.append_score(record).await {
            Ok(()) => {
                info!(
                    score_id = %record.id,
                    session_id = %record.session_id,
                    percentage = record.percentage,
                    "score saved"
                );
                true
            }
            Err(err) => {
                warn!(score_id = %record.id, error = %err, "failed to persist score");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn all_scores(&self) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.list_scores().await?)
    }

    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn user_scores(&self, user_name: &str) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.scores_by_user(user_name).await?)
    }

    /// Records for a category id, or `"test"` for comprehensive tests.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn session_scores(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.scores_by_session(session_id).await?)
    }

    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn top_scores(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.top_scores(session_id, limit).await?)
    }

    /// Ranked entries for the best `limit` attempts at a session.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn leaderboard(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ScoreServiceError> {
        let top = self.top_scores(session_id, limit).await?;
        Ok(scoring::rank(&top))
    }

    /// The user's best attempt, optionally restricted to one session.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn user_best_score(
        &self,
        user_name: &str,
        session_id: Option<&SessionId>,
    ) -> Result<Option<ScoreRecord>, ScoreServiceError> {
        let mut records = self.user_scores(user_name).await?;
        if let Some(session_id) = session_id {
            records.retain(|r| &r.session_id == session_id);
        }
        Ok(scoring::top_scores(records, 1).into_iter().next())
    }

    /// Mean percentage over every attempt by the user; 0 with no attempts.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn user_average_percentage(&self, user_name: &str) -> Result<u32, ScoreServiceError> {
        let records = self.user_scores(user_name).await?;
        Ok(scoring::average_percentage(&records))
    }

    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` if repository access fails.
    pub async fn session_stats(&self, session_id: &SessionId) -> Result<ScoreStats, ScoreServiceError> {
        let records = self.session_scores(session_id).await?;
        Ok(ScoreStats::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AnswerRecord, QuestionId, ScoreId, SessionMode, UserId};
    use quiz_core::scoring::percentage;
    use quiz_core::time::fixed_now;

    fn record(id: &str, user: &str, session: &str, score: u32, total: u32) -> ScoreRecord {
        ScoreRecord {
            id: ScoreId::new(id),
            user_id: UserId::new(format!("user_{user}")),
            user_name: user.into(),
            session_id: SessionId::new(session),
            session_name: session.into(),
            score,
            total_questions: total,
            percentage: percentage(score, total),
            timestamp: fixed_now() + Duration::minutes(id.len() as i64),
            mode: SessionMode::Quiz,
            answers: (0..total)
                .map(|i| AnswerRecord {
                    question_id: QuestionId::new(format!("q{i}")),
                    user_answer: Some(0),
                    correct_answer: Some(0),
                    is_correct: i < score,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn invalid_records_are_rejected_without_error() {
        let svc = ScoreService::in_memory();

        let mut too_high = record("a", "ali", "adab", 5, 4);
        too_high.percentage = 100;
        assert!(!svc.save_score(&too_high).await);

        let mut nameless = record("b", "ali", "adab", 2, 4);
        nameless.user_name = "  ".into();
        assert!(!svc.save_score(&nameless).await);

        let mut skewed = record("c", "ali", "adab", 2, 4);
        skewed.percentage = 51;
        assert!(!svc.save_score(&skewed).await);

        assert!(svc.all_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_save_reports_false() {
        let svc = ScoreService::in_memory();
        let rec = record("a", "ali", "adab", 2, 4);
        assert!(svc.save_score(&rec).await);
        assert!(!svc.save_score(&rec).await);
        assert_eq!(svc.all_scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leaderboard_ranks_from_one() {
        let svc = ScoreService::in_memory();
        assert!(svc.save_score(&record("a", "ali", "adab", 2, 4)).await);
        assert!(svc.save_score(&record("bb", "abu", "adab", 4, 4)).await);
        assert!(svc.save_score(&record("ccc", "siti", "adab", 2, 4)).await);
        assert!(svc.save_score(&record("dddd", "umar", "test", 4, 4)).await);

        let board = svc.leaderboard(&SessionId::new("adab"), 10).await.unwrap();
        let names: Vec<_> = board.iter().map(|e| (e.rank, e.user_name.as_str())).collect();
        assert_eq!(names, vec![(1, "abu"), (2, "siti"), (3, "ali")]);
    }

    #[tokio::test]
    async fn user_statistics() {
        let svc = ScoreService::in_memory();
        assert!(svc.save_score(&record("a", "ali", "adab", 1, 8)).await);
        assert!(svc.save_score(&record("bb", "ali", "fiqh", 3, 4)).await);
        assert!(svc.save_score(&record("ccc", "abu", "adab", 4, 4)).await);

        let best = svc.user_best_score("ali", None).await.unwrap().unwrap();
        assert_eq!(best.id.as_str(), "bb");
        let best_adab = svc
            .user_best_score("ali", Some(&SessionId::new("adab")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(best_adab.id.as_str(), "a");
        assert!(svc.user_best_score("nobody", None).await.unwrap().is_none());

        // (13 + 75) / 2 = 44
        assert_eq!(svc.user_average_percentage("ali").await.unwrap(), 44);
        assert_eq!(svc.user_average_percentage("nobody").await.unwrap(), 0);

        let stats = svc.session_stats(&SessionId::new("adab")).await.unwrap();
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.highest_percentage, 100);
        assert_eq!(stats.lowest_percentage, 13);
        assert_eq!(stats.average_percentage, 57); // 56.5 rounds up
    }
}
