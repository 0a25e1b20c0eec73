#![forbid(unsafe_code)]

pub mod app_services;
pub mod content;
pub mod error;
pub mod scores;
pub mod sessions;
pub mod study;
pub mod users;
pub mod workflow;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use content::{load_content, parse_content};
pub use error::{AppServicesError, ContentError, ScoreServiceError, SessionError, UserServiceError};
pub use scores::{ResultRecord, ScoreService, compile_score_record};
pub use sessions::{
    SessionEngine, SessionEvent, SessionPhase, SessionPool, SessionSettings, SessionState,
    SessionView,
};
pub use study::StudySession;
pub use users::UserService;
pub use workflow::{QuizWorkflow, SessionOutcome};
