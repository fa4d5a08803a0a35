use chrono::{DateTime, Utc};
use quiz_core::model::{ScoreId, ScoreRecord, ScoreReport};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ScoreRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn id_i64(id: ScoreId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("score id overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRecord, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let id = u64::try_from(id)
        .map(ScoreId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid id: {id}")))?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    let report = ScoreReport::new(score, total).map_err(ser)?;
    Ok(ScoreRecord::new(id, report, created_at))
}

#[async_trait::async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(
        &self,
        report: ScoreReport,
        created_at: DateTime<Utc>,
    ) -> Result<ScoreRecord, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_scores (score, total, created_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(i64::from(report.score()))
        .bind(i64::from(report.total()))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = u64::try_from(res.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("negative rowid".into()))?;
        Ok(ScoreRecord::new(ScoreId::new(id), report, created_at))
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, score, total, created_at
                FROM quiz_scores
                WHERE id = ?1
            ",
        )
        .bind(id_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_score_row(&row)
    }

    async fn list_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, score, total, created_at
                FROM quiz_scores
                ORDER BY id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_score_row).collect()
    }
}
