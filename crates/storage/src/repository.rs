use async_trait::async_trait;
use quiz_core::model::{ScoreRecord, SessionId, User, UserId};
use quiz_core::scoring;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Append-only store of completed session scores.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Persist a new score record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a record with the same id exists,
    /// or other storage errors.
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError>;

    /// Every stored record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Records stamped with the given user name, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn scores_by_user(&self, user_name: &str) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Records for a category id (or `"test"`), oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn scores_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Best `limit` records for a session: percentage desc, score desc, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be read.
    async fn top_scores(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, StorageError>;
}

/// Store of learner profiles plus the currently selected one.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or replace a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError>;

    /// All users in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the users cannot be read.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Remove a user. Clears the current-user pointer if it referenced them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such user exists.
    async fn delete_user(&self, id: &UserId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the pointer cannot be read.
    async fn current_user(&self) -> Result<Option<UserId>, StorageError>;

    /// Point at a user, or clear the pointer with `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn set_current_user(&self, id: Option<&UserId>) -> Result<(), StorageError>;
}

#[derive(Default)]
struct UserState {
    users: Vec<User>,
    current: Option<UserId>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<Vec<ScoreRecord>>>,
    users: Arc<Mutex<UserState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(
        &self,
        keep: impl Fn(&ScoreRecord) -> bool,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(record.clone());
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        self.filtered(|_| true)
    }

    async fn scores_by_user(&self, user_name: &str) -> Result<Vec<ScoreRecord>, StorageError> {
        self.filtered(|r| r.user_name == user_name)
    }

    async fn scores_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        self.filtered(|r| &r.session_id == session_id)
    }

    async fn top_scores(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let records = self.scores_by_session(session_id).await?;
        Ok(scoring::top_scores(records, limit))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.users.iter_mut().find(|u| u.id() == user.id()) {
            Some(existing) => *existing = user.clone(),
            None => guard.users.push(user.clone()),
        }
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.users.iter().find(|u| u.id() == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.users.clone())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.users.len();
        guard.users.retain(|u| u.id() != id);
        if guard.users.len() == before {
            return Err(StorageError::NotFound);
        }
        if guard.current.as_ref() == Some(id) {
            guard.current = None;
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserId>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.current.clone())
    }

    async fn set_current_user(&self, id: Option<&UserId>) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(id) = id {
            if !guard.users.iter().any(|u| u.id() == id) {
                return Err(StorageError::NotFound);
            }
        }
        guard.current = id.cloned();
        Ok(())
    }
}

/// The persistence gateway handed to services: score and user repositories
/// behind trait objects so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let scores: Arc<dyn ScoreRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo);
        Self { scores, users }
    }
}
