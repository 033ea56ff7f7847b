use brevet_core::model::TrackerState;
use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{StorageError, TrackerStateRepository};

#[async_trait::async_trait]
impl TrackerStateRepository for SqliteRepository {
    async fn load_state(&self, namespace: &str) -> Result<Option<TrackerState>, StorageError> {
        let row = sqlx::query("SELECT payload FROM tracker_state WHERE namespace = ?1")
            .bind(namespace)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload").map_err(ser)?;
        serde_json::from_str(&payload).map(Some).map_err(ser)
    }

    async fn save_state(&self, namespace: &str, state: &TrackerState) -> Result<(), StorageError> {
        let payload = serde_json::to_string(state).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO tracker_state (namespace, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(namespace) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(namespace)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
