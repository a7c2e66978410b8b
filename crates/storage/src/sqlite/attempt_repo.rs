use quiz_core::model::Attempt;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_attempt_row};
use crate::repository::{AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn open(&self) -> Result<(), StorageError> {
        self.pool().await.map(|_| ()).map_err(conn)
    }

    async fn append_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let pool = self.pool().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO attempts (date, score, total_questions)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(attempt.completed_at())
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.total_questions()))
        .execute(pool)
        .await
        .map_err(conn)?;

        tracing::debug!(
            id = res.last_insert_rowid(),
            score = attempt.score(),
            total = attempt.total_questions(),
            "attempt appended"
        );
        Ok(())
    }

    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError> {
        let pool = self.pool().await.map_err(conn)?;

        let rows = sqlx::query(
            r"
                SELECT id, date, score, total_questions
                FROM attempts
                ORDER BY id ASC
            ",
        )
        .fetch_all(pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match map_attempt_row(&row) {
                Ok(attempt) => out.push(attempt),
                Err(err) => {
                    let id: i64 = row.try_get("id").unwrap_or_default();
                    tracing::warn!(id, error = %err, "skipping unreadable attempt row");
                }
            }
        }
        Ok(out)
    }
}
