use serde::Deserialize;
use thiserror::Error;

use crate::model::question::{OPTION_COUNT, Question, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank cannot be empty")]
    Empty,

    #[error("invalid question bank json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question {index} is invalid: {source}")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// Immutable, non-empty, ordered set of questions a session draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// # Errors
    ///
    /// Returns `BankError::Empty` when no questions are given.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self { questions })
    }

    /// Parses a bank from a JSON array of
    /// `{"text", "options": [4 strings], "correct_index"}` objects.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Json` for malformed input, `BankError::Question`
    /// for the first invalid entry, and `BankError::Empty` for `[]`.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let records: Vec<QuestionRecord> =
            serde_json::from_str(json)?;
        let questions = records
            .into_iter()
            .enumerate()
            .map(|(index, r)| {
                Question::from_parts(r.text, r.options, r.correct_index)
                    .map_err(|source| BankError::Question { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// The ten general-health questions used by the reference quiz page.
    ///
    /// # Panics
    ///
    /// Panics if the built-in questions fail validation.
    #[must_use]
    pub fn health_basics() -> Self {
        const HEALTH_BASICS: [(&str, [&str; OPTION_COUNT], usize); 10] = [
            ("Strongest bone?", ["Jaw", "Femur", "Skull", "Rib"], 1),
            (
                "Normal body temperature (approx)?",
                ["35°C", "37°C", "39°C", "41°C"],
                1,
            ),
            (
                "ORS is mainly used for?",
                ["Pain relief", "Rehydration", "Sleep", "Allergy"],
                1,
            ),
            (
                "Which organ pumps blood?",
                ["Lungs", "Kidney", "Heart", "Liver"],
                2,
            ),
            (
                "Vitamin from sunlight?",
                ["Vit A", "Vit B12", "Vit C", "Vit D"],
                3,
            ),
            (
                "Dengue spreads by?",
                ["Housefly", "Mosquito", "Water", "Food"],
                1,
            ),
            (
                "High BP is called?",
                ["Hypotension", "Hypertension", "Diabetes", "Asthma"],
                1,
            ),
            (
                "Which is a respiratory disease?",
                ["Pneumonia", "Gastritis", "Diabetes", "Ulcer"],
                0,
            ),
            (
                "Main symptom of dehydration?",
                ["Wet skin", "Dark urine", "High hair growth", "Blue nails"],
                1,
            ),
            (
                "Handwashing helps prevent?",
                ["Infections", "Broken bones", "All cancers", "None"],
                0,
            ),
        ];

        let questions = HEALTH_BASICS
            .into_iter()
            .map(|(text, options, correct)| {
                Question::new(text, options, correct).expect("built-in question should be valid")
            })
            .collect();
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
}
