use std::env;

use quiz_core::model::{DEFAULT_QUESTION_SECS, QuizSettings};

use crate::error::ConfigError;
use crate::scores::ScoreApiConfig;

/// Runtime configuration for quiz services, usually read from the environment.
#[derive(Debug, Clone, Default)]
pub struct QuizConfig {
    pub settings: QuizSettings,
    /// Remote score endpoint; `None` disables remote reporting.
    pub api: Option<ScoreApiConfig>,
    /// `SQLite` URL for the local history; `None` keeps history in memory.
    pub database_url: Option<String>,
}

impl QuizConfig {
    /// Reads `QUIZ_QUESTION_SECS`, `QUIZ_SHUFFLE`, `QUIZ_DATABASE_URL`,
    /// `QUIZ_API_BASE_URL` and `QUIZ_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let question_secs = match lookup("QUIZ_QUESTION_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidQuestionSecs { raw: raw.clone() })?,
            None => DEFAULT_QUESTION_SECS,
        };
        let shuffle = match lookup("QUIZ_SHUFFLE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidShuffle { raw })?,
            None => true,
        };
        let settings = QuizSettings::new(question_secs, shuffle)?;
        let database_url = lookup("QUIZ_DATABASE_URL").filter(|url| !url.trim().is_empty());
        let api = ScoreApiConfig::from_lookup(&lookup)?;

        Ok(Self {
            settings,
            api,
            database_url,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
