use std::path::Path;
use std::sync::Arc;

use quiz_core::model::ContentData;
use quiz_core::sampler::{RandomSource, RngSource};
use storage::repository::Storage;

use crate::Clock;
use crate::content::load_content;
use crate::error::AppServicesError;
use crate::scores::ScoreService;
use crate::sessions::{SessionEngine, SessionSettings};
use crate::users::UserService;
use crate::workflow::QuizWorkflow;

/// Assembles app-facing services around one content set and one store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    settings: SessionSettings,
    content: Arc<ContentData>,
    scores: Arc<ScoreService>,
    users: Arc<UserService>,
}

impl AppServices {
    #[must_use]
    pub fn new(clock: Clock, settings: SessionSettings, content: ContentData, storage: &Storage) -> Self {
        Self {
            clock,
            settings,
            content: Arc::new(content),
            scores: Arc::new(ScoreService::new(Arc::clone(&storage.scores))),
            users: Arc::new(UserService::new(clock, Arc::clone(&storage.users))),
        }
    }

    /// Build services backed by `SQLite` storage and a content file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or content loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        content_path: impl AsRef<Path>,
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, AppServicesError> {
        let content = load_content(content_path).await?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, settings, content, &storage))
    }

    /// Services over in-memory storage, mostly for tests.
    #[must_use]
    pub fn in_memory(clock: Clock, content: ContentData) -> Self {
        Self::new(clock, SessionSettings::default(), content, &Storage::in_memory())
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentData> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn scores(&self) -> Arc<ScoreService> {
        Arc::clone(&self.scores)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    /// A workflow with an OS-seeded random source.
    #[must_use]
    pub fn workflow(&self) -> QuizWorkflow {
        QuizWorkflow::new(
            SessionEngine::new(self.settings.clone(), self.clock),
            self.scores.as_ref().clone(),
        )
    }

    /// A workflow that replays the same sessions for the same seed.
    #[must_use]
    pub fn seeded_workflow(&self, seed: u64) -> QuizWorkflow {
        self.workflow_with_rng(RngSource::seeded(seed))
    }

    #[must_use]
    pub fn workflow_with_rng<R: RandomSource>(&self, rng: R) -> QuizWorkflow<R> {
        QuizWorkflow::new(
            SessionEngine::with_rng(self.settings.clone(), self.clock, rng),
            self.scores.as_ref().clone(),
        )
    }
}
