use std::sync::Arc;

use quiz_core::model::{QuestionBank, QuizSettings};
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::{QuizServicesError, ReportError};
use crate::scores::{
    HttpScoreReporter, RemoteScore, RepositoryScoreReporter, ScoreApiConfig, ScoreHistoryService,
    ScoreReporter,
};
use crate::sessions::{QuizHandle, QuizSession, QuizSessionLoop};

/// Assembles the question bank, settings, score reporters and history.
#[derive(Clone)]
pub struct QuizServices {
    settings: QuizSettings,
    bank: QuestionBank,
    history: Arc<ScoreHistoryService>,
    reporters: Vec<Arc<dyn ScoreReporter>>,
    remote: Option<Arc<HttpScoreReporter>>,
}

impl QuizServices {
    /// Services with the built-in bank and an in-memory score history.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: QuizSettings) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, settings)
    }

    /// Services backed by `SQLite` score history.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, QuizServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    /// Build services from configuration: `SQLite` history when a database
    /// URL is set, and a remote reporter when the score API is configured.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if storage initialization fails.
    pub async fn from_config(config: &QuizConfig, clock: Clock) -> Result<Self, QuizServicesError> {
        let services = match &config.database_url {
            Some(url) => Self::new_sqlite(url, clock, config.settings).await?,
            None => Self::in_memory(clock, config.settings),
        };
        Ok(match &config.api {
            Some(api) => services.with_remote_reporter(api.clone()),
            None => services,
        })
    }

    fn from_storage(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let local: Arc<dyn ScoreReporter> = Arc::new(RepositoryScoreReporter::new(
            clock,
            Arc::clone(&storage.scores),
        ));
        Self {
            settings,
            bank: QuestionBank::health_basics(),
            history: Arc::new(ScoreHistoryService::new(Arc::clone(&storage.scores))),
            reporters: vec![local],
            remote: None,
        }
    }

    #[must_use]
    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    /// Replace the built-in bank with one parsed from JSON.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError::Bank` if the JSON is malformed, empty, or
    /// holds an invalid question.
    pub fn with_bank_json(self, json: &str) -> Result<Self, QuizServicesError> {
        let bank = QuestionBank::from_json(json)?;
        Ok(self.with_bank(bank))
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ScoreReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Also send finished scores to the remote score API.
    #[must_use]
    pub fn with_remote_reporter(mut self, config: ScoreApiConfig) -> Self {
        info!(base_url = %config.base_url(), "remote score reporting enabled");
        let remote = Arc::new(HttpScoreReporter::new(Some(config)));
        self.reporters.push(Arc::clone(&remote) as Arc<dyn ScoreReporter>);
        self.remote = Some(remote);
        self
    }

    #[must_use]
    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn history(&self) -> Arc<ScoreHistoryService> {
        Arc::clone(&self.history)
    }

    /// A synchronous session over the configured bank.
    #[must_use]
    pub fn new_session(&self) -> QuizSession {
        QuizSession::new(self.bank.clone(), self.settings)
    }

    /// A session loop wired to every configured reporter, ready to spawn.
    #[must_use]
    pub fn start_session(&self) -> (QuizSessionLoop, QuizHandle) {
        let (quiz, handle) = QuizSessionLoop::new(self.new_session());
        let quiz = self
            .reporters
            .iter()
            .fold(quiz, |quiz, reporter| quiz.with_reporter(Arc::clone(reporter)));
        (quiz, handle)
    }

    /// Score history kept by the remote score API.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Disabled` when no remote API is configured, or
    /// the request error otherwise.
    pub async fn remote_history(&self) -> Result<Vec<RemoteScore>, ReportError> {
        match &self.remote {
            Some(remote) => remote.fetch_history().await,
            None => Err(ReportError::Disabled),
        }
    }
}
