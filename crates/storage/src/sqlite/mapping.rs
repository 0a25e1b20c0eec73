use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerRecord, QuestionId, ScoreId, ScoreRecord, SessionId, SessionMode, User, UserId,
    answer_index::SENTINEL,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn index_to_i64(index: Option<usize>) -> Result<i64, StorageError> {
    index.map_or(Ok(SENTINEL), |i| {
        i64::try_from(i).map_err(|_| StorageError::Serialization("answer index overflow".into()))
    })
}

fn index_from_i64(v: i64) -> Option<usize> {
    usize::try_from(v).ok()
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn limit_to_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Maps a `scores` row; answers are loaded separately.
pub(crate) fn map_score_row(row: &SqliteRow) -> Result<ScoreRecord, StorageError> {
    let mode: String = row.try_get("mode").map_err(ser)?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp").map_err(ser)?;

    Ok(ScoreRecord {
        id: ScoreId::new(row.try_get::<String, _>("id").map_err(ser)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?),
        user_name: row.try_get("user_name").map_err(ser)?,
        session_id: SessionId::new(row.try_get::<String, _>("session_id").map_err(ser)?),
        session_name: row.try_get("session_name").map_err(ser)?,
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get("total_questions").map_err(ser)?,
        )?,
        percentage: u32_from_i64("percentage", row.try_get("percentage").map_err(ser)?)?,
        timestamp,
        mode: mode.parse::<SessionMode>().map_err(ser)?,
        answers: Vec::new(),
    })
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<AnswerRecord, StorageError> {
    Ok(AnswerRecord {
        question_id: QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?),
        user_answer: index_from_i64(row.try_get("user_answer").map_err(ser)?),
        correct_answer: index_from_i64(row.try_get("correct_answer").map_err(ser)?),
        is_correct: row.try_get::<bool, _>("is_correct").map_err(ser)?,
    })
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let id = UserId::new(row.try_get::<String, _>("id").map_err(ser)?);
    let name: String = row.try_get("name").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    User::from_persisted(id, &name, created_at).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanswered_index_maps_to_sentinel() {
        assert_eq!(index_to_i64(None).unwrap(), -1);
        assert_eq!(index_to_i64(Some(3)).unwrap(), 3);
        assert_eq!(index_from_i64(-1), None);
        assert_eq!(index_from_i64(2), Some(2));
    }
}
