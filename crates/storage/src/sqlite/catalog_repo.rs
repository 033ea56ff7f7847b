use brevet_core::model::{ExamDefinition, ExamId};

use super::SqliteRepository;
use super::mapping::{map_exam_row, ser};
use crate::repository::{ExamCatalog, StorageError};

#[async_trait::async_trait]
impl ExamCatalog for SqliteRepository {
    async fn get_exam(&self, id: &ExamId) -> Result<Option<ExamDefinition>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, year, duration_minutes, exercises
            FROM exam_definitions WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_exam_row).transpose()
    }

    async fn list_exams(&self) -> Result<Vec<ExamDefinition>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, year, duration_minutes, exercises
            FROM exam_definitions
            ORDER BY year DESC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_exam_row).collect()
    }

    async fn upsert_exam(&self, exam: &ExamDefinition) -> Result<(), StorageError> {
        let exercises = serde_json::to_string(&exam.exercises).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO exam_definitions (id, title, year, duration_minutes, exercises)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                year = excluded.year,
                duration_minutes = excluded.duration_minutes,
                exercises = excluded.exercises
            ",
        )
        .bind(exam.id.as_str())
        .bind(&exam.title)
        .bind(i64::from(exam.year))
        .bind(i64::from(exam.duration_minutes))
        .bind(exercises)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::debug!(exam_id = %exam.id, "exam definition upserted");
        Ok(())
    }
}
