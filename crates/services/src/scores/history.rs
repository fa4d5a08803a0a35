use std::sync::Arc;

use chrono::{DateTime, Utc};

use quiz_core::model::ScoreId;
use storage::repository::ScoreRepository;

use crate::error::HistoryError;

/// One display row of the local score history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHistoryItem {
    /// 1-based row number, newest first.
    pub row: usize,
    pub id: ScoreId,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    pub created_at: DateTime<Utc>,
}

/// Aggregate over the listed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreHistorySummary {
    pub attempts: usize,
    pub best_percent: Option<u32>,
    pub average_percent: Option<u32>,
}

/// Read-only view over recorded scores.
#[derive(Clone)]
pub struct ScoreHistoryService {
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreHistoryService {
    #[must_use]
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    /// Most recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the repository query fails.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ScoreHistoryItem>, HistoryError> {
        let records = self.scores.list_scores(limit).await?;
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let report = record.report();
                ScoreHistoryItem {
                    row: i + 1,
                    id: record.id(),
                    score: report.score(),
                    total: report.total(),
                    percent: report.percent(),
                    created_at: record.created_at(),
                }
            })
            .collect())
    }

    /// Best and average percentage across the most recent `limit` attempts.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the repository query fails.
    pub async fn summary(&self, limit: u32) -> Result<ScoreHistorySummary, HistoryError> {
        let items = self.recent(limit).await?;
        if items.is_empty() {
            return Ok(ScoreHistorySummary::default());
        }

        let attempts = items.len();
        let best = items.iter().map(|item| item.percent).max();
        let sum: u64 = items.iter().map(|item| u64::from(item.percent)).sum();
        let average = u32::try_from(sum / attempts as u64).ok();

        Ok(ScoreHistorySummary {
            attempts,
            best_percent: best,
            average_percent: average,
        })
    }
}
