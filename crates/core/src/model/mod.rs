mod ids;
mod question;
mod score;
mod user;

pub use ids::{CategoryId, ParseIdError, QuestionId, ScoreId, SessionId, TopicId, UserId};
pub use question::{ContentData, ContentIssue, Question, QuizCategory, StudyNote, StudyTopic};
pub use score::{
    AnswerRecord, LeaderboardEntry, ScoreRecord, ScoreRecordError, SessionMode, answer_index,
};
pub use user::{User, UserError, UserIdentity};
