//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{BankError, QuizSettingsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by score reporters.
///
/// The session loop logs these and moves on; they never reach the player.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("score reporting is not configured")]
    Disabled,
    #[error("score endpoint responded with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScoreHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid QUIZ_QUESTION_SECS value: {raw}")]
    InvalidQuestionSecs { raw: String },
    #[error("invalid QUIZ_SHUFFLE value: {raw}")]
    InvalidShuffle { raw: String },
    #[error("invalid score API base url {raw}: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The session loop has stopped and can no longer take commands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("quiz session loop has stopped")]
pub struct LoopClosed;
