//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::UserError;
use quiz_core::options::OptionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    NoQuestionsAvailable,
    #[error("no session has been started")]
    SessionNotStarted,
    #[error(transparent)]
    Options(#[from] OptionError),
}

/// Errors emitted by `ScoreService` queries. Saving never errors; see
/// `ScoreService::save_score`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("a user named {0:?} already exists")]
    DuplicateName(String),
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading quiz content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid content JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
