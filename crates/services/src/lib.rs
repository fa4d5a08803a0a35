#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod scores;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use config::QuizConfig;
pub use error::{ConfigError, HistoryError, LoopClosed, QuizServicesError, ReportError};
pub use scores::{
    HttpScoreReporter, RemoteScore, RepositoryScoreReporter, ScoreApiConfig, ScoreHistoryItem,
    ScoreHistoryService, ScoreHistorySummary, ScoreReporter,
};
pub use sessions::{
    Advance, FinishedView, OptionView, QuestionView, QuizCommand, QuizHandle, QuizSession, QuizSessionLoop,
    Resolution, SessionPhase, SessionState, SessionView, Tick, TimerHandle,
};
