use thiserror::Error;

/// Seconds allowed per question unless configured otherwise.
pub const DEFAULT_QUESTION_SECS: u32 = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("question time limit must be > 0 seconds")]
    InvalidQuestionSecs,
}

/// Per-session quiz behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    question_secs: u32,
    shuffle: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_secs: DEFAULT_QUESTION_SECS,
            shuffle: true,
        }
    }
}

impl QuizSettings {
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidQuestionSecs` when `question_secs` is zero.
    pub fn new(question_secs: u32, shuffle: bool) -> Result<Self, QuizSettingsError> {
        if question_secs == 0 {
            return Err(QuizSettingsError::InvalidQuestionSecs);
        }
        Ok(Self {
            question_secs,
            shuffle,
        })
    }

    #[must_use]
    pub fn question_secs(&self) -> u32 {
        self.question_secs
    }

    /// When false, sessions keep the bank's canonical order.
    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}
