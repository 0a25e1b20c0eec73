use quiz_core::model::{Question, QuizCategory, SessionId, SessionMode};
use quiz_core::options::{DEFAULT_DISPLAY_SIZE, DisplayOptions, build_display_options};
use quiz_core::sampler::{RandomSource, sample_without_replacement};

use crate::error::SessionError;

/// Tunables for session construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Questions drawn for a single-category quiz.
    pub quiz_question_count: usize,
    /// Upper bound on questions drawn for a cross-category test.
    pub test_question_cap: usize,
    /// Options shown per question.
    pub display_size: usize,
    /// Name stamped on test-mode score records.
    pub test_session_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quiz_question_count: 10,
            test_question_cap: 30,
            display_size: DEFAULT_DISPLAY_SIZE,
            test_session_name: "Comprehensive Test".to_owned(),
        }
    }
}

/// Where a session draws its questions from.
#[derive(Debug, Clone, Copy)]
pub enum SessionPool<'a> {
    /// Quiz mode: one category.
    Category(&'a QuizCategory),
    /// Test mode: every category pooled together.
    AllCategories(&'a [QuizCategory]),
}

impl SessionPool<'_> {
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionPool::Category(_) => SessionMode::Quiz,
            SessionPool::AllCategories(_) => SessionMode::Test,
        }
    }

    fn questions(&self) -> Vec<&Question> {
        match self {
            SessionPool::Category(category) => category.questions.iter().collect(),
            SessionPool::AllCategories(categories) => categories
                .iter()
                .flat_map(|c| c.questions.iter())
                .collect(),
        }
    }

    fn scope(&self, settings: &SessionSettings) -> SessionScope {
        match self {
            SessionPool::Category(category) => SessionScope {
                id: SessionId::from(&category.id),
                name: category.name.clone(),
                mode: SessionMode::Quiz,
            },
            SessionPool::AllCategories(_) => SessionScope {
                id: SessionId::test(),
                name: settings.test_session_name.clone(),
                mode: SessionMode::Test,
            },
        }
    }
}

/// Identity of a running session, copied onto its score record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScope {
    pub id: SessionId,
    pub name: String,
    pub mode: SessionMode,
}

/// A question bound to the options shown for it in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    pub question: Question,
    pub display: DisplayOptions,
}

impl SessionQuestion {
    #[must_use]
    pub fn displayed_options(&self) -> &[String] {
        self.display.options()
    }

    #[must_use]
    pub fn correct_display_index(&self) -> Option<usize> {
        self.display.correct_index()
    }
}

/// The frozen question sequence for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub scope: SessionScope,
    pub questions: Vec<SessionQuestion>,
}

/// Samples a pool down to the session size and prepares every question's options.
pub struct SessionBuilder<'a> {
    settings: &'a SessionSettings,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(settings: &'a SessionSettings) -> Self {
        Self { settings }
    }

    /// Build a plan from `pool`.
    ///
    /// Quiz mode takes `quiz_question_count` questions, test mode at most
    /// `test_question_cap`; smaller pools contribute every question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestionsAvailable` if the pool is empty.
    /// Returns `SessionError::Options` if a sampled question has a bad correct index.
    pub fn build(
        &self,
        pool: SessionPool<'_>,
        rng: &mut impl RandomSource,
    ) -> Result<SessionPlan, SessionError> {
        let candidates = pool.questions();
        if candidates.is_empty() {
            return Err(SessionError::NoQuestionsAvailable);
        }

        let take = match pool.mode() {
            SessionMode::Quiz => self.settings.quiz_question_count,
            SessionMode::Test => self.settings.test_question_cap,
        };
        let sampled = sample_without_replacement(&candidates, take, rng);

        let mut questions = Vec::with_capacity(sampled.len());
        for question in sampled {
            let display = build_display_options(question, self.settings.display_size, rng)?;
            questions.push(SessionQuestion {
                question: question.clone(),
                display,
            });
        }

        Ok(SessionPlan {
            scope: pool.scope(self.settings),
            questions,
        })
    }
}
