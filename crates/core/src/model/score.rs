use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ScoreId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("total must be > 0")]
    EmptyTotal,

    #[error("score {score} exceeds total {total}")]
    ScoreAboveTotal { score: u32, total: u32 },
}

/// Final result of a finished session, as handed to the score endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReport")]
pub struct ScoreReport {
    score: u32,
    total: u32,
}

impl ScoreReport {
    /// # Errors
    ///
    /// Returns `ScoreError` if `total` is zero or `score > total`.
    pub fn new(score: u32, total: u32) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::EmptyTotal);
        }
        if score > total {
            return Err(ScoreError::ScoreAboveTotal { score, total });
        }
        Ok(Self { score, total })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whole-number percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> u32 {
        let pct = u64::from(self.score) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(100)
    }
}

#[derive(Deserialize)]
struct RawReport {
    score: u32,
    total: u32,
}

impl TryFrom<RawReport> for ScoreReport {
    type Error = ScoreError;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        Self::new(raw.score, raw.total)
    }
}

/// A score report that has been stored in the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    id: ScoreId,
    report: ScoreReport,
    created_at: DateTime<Utc>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(id: ScoreId, report: ScoreReport, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            report,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> ScoreId {
        self.id
    }

    #[must_use]
    pub fn report(&self) -> ScoreReport {
        self.report
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
