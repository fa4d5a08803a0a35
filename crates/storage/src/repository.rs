use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{ScoreId, ScoreRecord, ScoreReport};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for finished-quiz score history.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Store a finished session's score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_score(
        &self,
        report: ScoreReport,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError>;

    /// Fetch a single record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError>;

    /// List up to `limit` records, most recently stored first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if records cannot be loaded.
    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(
        &self,
        report: ScoreReport,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = u64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("score id overflow".into()))?
            + 1;
        let record = ScoreRecord::new(ScoreId::new(next), report, created_at);
        guard.push(record.clone());
        Ok(record)
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

/// Holds the score repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            scores: Arc::new(InMemoryRepository::new()),
        }
    }
}
