use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

const LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct index {0} is outside 0..4")]
    CorrectIndexOutOfRange(usize),
}

//
// ─── OPTION INDEX ──────────────────────────────────────────────────────────────
//

/// Position of an option within a question, always in `0..OPTION_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct OptionIndex(u8);

impl OptionIndex {
    /// Returns `None` when `index` does not address one of the four options.
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        if index < OPTION_COUNT {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    /// All option positions in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..OPTION_COUNT).filter_map(Self::new)
    }

    #[must_use]
    pub fn value(self) -> usize {
        usize::from(self.0)
    }

    /// Display letter, `A` through `D`.
    #[must_use]
    pub fn letter(self) -> char {
        LETTERS[self.value()]
    }
}

impl TryFrom<usize> for OptionIndex {
    type Error = QuestionError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuestionError::CorrectIndexOutOfRange(value))
    }
}

impl From<OptionIndex> for usize {
    fn from(index: OptionIndex) -> Self {
        index.value()
    }
}

//
// ─── RESOLUTION ────────────────────────────────────────────────────────────────
//

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The selected option was the correct one.
    Correct,
    /// An option was selected but it was not the correct one.
    Wrong,
    /// The countdown ran out before any selection.
    Timeout,
}

impl Outcome {
    /// Status line shown under a resolved question.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Correct => "Correct!",
            Outcome::Wrong => "Wrong",
            Outcome::Timeout => "Time up!",
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

/// Per-option marking after (or before) resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionMark {
    #[default]
    Neutral,
    Correct,
    Wrong,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with four fixed-order options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: [String; OPTION_COUNT],
    correct: OptionIndex,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or any option is blank, or if
    /// `correct_index` does not address one of the options.
    pub fn new(
        text: impl Into<String>,
        options: [&str; OPTION_COUNT],
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        Self::from_parts(text.into(), options.map(str::to_owned), correct_index)
    }

    pub(crate) fn from_parts(
        text: String,
        options: [String; OPTION_COUNT],
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        let correct = OptionIndex::try_from(correct_index)?;

        Ok(Self {
            text,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: OptionIndex) -> &str {
        &self.options[index.value()]
    }

    #[must_use]
    pub fn correct_index(&self) -> OptionIndex {
        self.correct
    }

    /// Classifies a resolution; `None` means the question timed out.
    #[must_use]
    pub fn outcome(&self, selected: Option<OptionIndex>) -> Outcome {
        match selected {
            Some(index) if index == self.correct => Outcome::Correct,
            Some(_) => Outcome::Wrong,
            None => Outcome::Timeout,
        }
    }

    /// Marks every option for a resolved question.
    ///
    /// The correct option is always marked correct; a wrong selection is
    /// additionally marked wrong.
    #[must_use]
    pub fn marks(&self, selected: Option<OptionIndex>) -> [OptionMark; OPTION_COUNT] {
        let mut marks = [OptionMark::Neutral; OPTION_COUNT];
        marks[self.correct.value()] = OptionMark::Correct;
        if let Some(index) = selected.filter(|i| *i != self.correct) {
            marks[index.value()] = OptionMark::Wrong;
        }
        marks
    }
}
