use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{QuestionId, ScoreId, SessionId, UserId};
use crate::scoring::percentage;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems that make a score record unfit for persistence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("total questions must be > 0")]
    NoQuestions,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("percentage {0} is outside 0..=100")]
    PercentageOutOfRange(u32),

    #[error("percentage {actual} does not match score (expected {expected})")]
    PercentageMismatch { expected: u32, actual: u32 },

    #[error("record has {answers} answers for {total} questions")]
    AnswerCountMismatch { answers: usize, total: u32 },

    #[error("unknown session mode: {0}")]
    UnknownMode(String),
}

//
// ─── SESSION MODE ──────────────────────────────────────────────────────────────
//

/// Which flavour of session produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Ten questions from a single category.
    Quiz,
    /// Up to thirty questions pooled from every category.
    Test,
}

impl SessionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Quiz => "quiz",
            SessionMode::Test => "test",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = ScoreRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(Self::Quiz),
            "test" => Ok(Self::Test),
            other => Err(ScoreRecordError::UnknownMode(other.to_owned())),
        }
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Per-question grading outcome stored alongside a score.
///
/// Indices refer to the displayed option set. An unanswered question (or one
/// with no valid answer) serializes its index as `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    #[serde(with = "answer_index")]
    pub user_answer: Option<usize>,
    #[serde(with = "answer_index")]
    pub correct_answer: Option<usize>,
    pub is_correct: bool,
}

/// Serde adapter mapping `None` to the `-1` sentinel and back.
pub mod answer_index {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    /// Sentinel written for "no answer".
    pub const SENTINEL: i64 = -1;

    /// # Errors
    ///
    /// Fails if the index does not fit in `i64`.
    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(index) => {
                let raw = i64::try_from(*index).map_err(ser::Error::custom)?;
                serializer.serialize_i64(raw)
            }
            None => serializer.serialize_i64(SENTINEL),
        }
    }

    /// # Errors
    ///
    /// Fails if the value is not an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            return Ok(None);
        }
        usize::try_from(raw).map(Some).map_err(de::Error::custom)
    }
}

//
// ─── SCORE RECORD ──────────────────────────────────────────────────────────────
//

/// Persisted result of one completed Quiz or Test session.
///
/// Field names follow the serialization contract every persistence backend
/// must honour. Records are append-only once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub user_id: UserId,
    pub user_name: String,
    pub session_id: SessionId,
    pub session_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub timestamp: DateTime<Utc>,
    pub mode: SessionMode,
    pub answers: Vec<AnswerRecord>,
}

impl ScoreRecord {
    /// Check the record is structurally sound before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns the first `ScoreRecordError` found.
    pub fn validate(&self) -> Result<(), ScoreRecordError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ScoreRecordError::MissingField("id"));
        }
        if self.user_id.as_str().trim().is_empty() {
            return Err(ScoreRecordError::MissingField("userId"));
        }
        if self.user_name.trim().is_empty() {
            return Err(ScoreRecordError::MissingField("userName"));
        }
        if self.session_id.as_str().trim().is_empty() {
            return Err(ScoreRecordError::MissingField("sessionId"));
        }
        if self.total_questions == 0 {
            return Err(ScoreRecordError::NoQuestions);
        }
        if self.score > self.total_questions {
            return Err(ScoreRecordError::ScoreExceedsTotal {
                score: self.score,
                total: self.total_questions,
            });
        }
        if self.percentage > 100 {
            return Err(ScoreRecordError::PercentageOutOfRange(self.percentage));
        }
        let expected = percentage(self.score, self.total_questions);
        if expected != self.percentage {
            return Err(ScoreRecordError::PercentageMismatch {
                expected,
                actual: self.percentage,
            });
        }
        if u32::try_from(self.answers.len()).ok() != Some(self.total_questions) {
            return Err(ScoreRecordError::AnswerCountMismatch {
                answers: self.answers.len(),
                total: self.total_questions,
            });
        }
        Ok(())
    }
}

/// One row of a ranked leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_name: String,
    pub score: u32,
    pub percentage: u32,
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn record(score: u32, total: u32) -> ScoreRecord {
        ScoreRecord {
            id: ScoreId::new("s1"),
            user_id: UserId::new("u1"),
            user_name: "Ali".into(),
            session_id: SessionId::new("adab"),
            session_name: "Adab".into(),
            score,
            total_questions: total,
            percentage: percentage(score, total),
            timestamp: fixed_now(),
            mode: SessionMode::Quiz,
            answers: (0..total)
                .map(|i| AnswerRecord {
                    question_id: QuestionId::new(format!("q{i}")),
                    user_answer: (i < score).then_some(0),
                    correct_answer: Some(0),
                    is_correct: i < score,
                })
                .collect(),
        }
    }

    #[test]
    fn valid_record_passes() {
        assert_eq!(record(3, 4).validate(), Ok(()));
    }

    #[test]
    fn rejects_score_above_total() {
        let mut r = record(3, 4);
        r.score = 5;
        assert_eq!(
            r.validate(),
            Err(ScoreRecordError::ScoreExceedsTotal { score: 5, total: 4 })
        );
    }

    #[test]
    fn rejects_zero_total_and_missing_fields() {
        let mut r = record(0, 1);
        r.total_questions = 0;
        assert_eq!(r.validate(), Err(ScoreRecordError::NoQuestions));

        let mut r = record(1, 1);
        r.user_name = "  ".into();
        assert_eq!(r.validate(), Err(ScoreRecordError::MissingField("userName")));
    }

    #[test]
    fn rejects_inconsistent_percentage() {
        let mut r = record(1, 2);
        r.percentage = 49;
        assert_eq!(
            r.validate(),
            Err(ScoreRecordError::PercentageMismatch {
                expected: 50,
                actual: 49
            })
        );
        r.percentage = 101;
        assert_eq!(r.validate(), Err(ScoreRecordError::PercentageOutOfRange(101)));
    }

    #[test]
    fn rejects_answer_count_mismatch() {
        let mut r = record(1, 2);
        r.answers.pop();
        assert!(matches!(
            r.validate(),
            Err(ScoreRecordError::AnswerCountMismatch { answers: 1, total: 2 })
        ));
    }

    #[test]
    fn unanswered_serializes_as_sentinel() {
        let answer = AnswerRecord {
            question_id: QuestionId::new("q1"),
            user_answer: None,
            correct_answer: Some(2),
            is_correct: false,
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["userAnswer"], -1);
        assert_eq!(json["correctAnswer"], 2);
        assert_eq!(json["questionId"], "q1");

        let back: AnswerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn mode_serializes_lowercase() {
        let json = serde_json::to_value(record(1, 1)).unwrap();
        assert_eq!(json["mode"], "quiz");
        assert_eq!("test".parse::<SessionMode>(), Ok(SessionMode::Test));
        assert!("exam".parse::<SessionMode>().is_err());
    }
}
