use brevet_core::model::{ExamDefinition, ExamId, Exercise};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u16_from_i64(field: &'static str, v: i64) -> Result<u16, StorageError> {
    u16::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_exam_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExamDefinition, StorageError> {
    let exercises_json: String = row.try_get("exercises").map_err(ser)?;
    let exercises: Vec<Exercise> = serde_json::from_str(&exercises_json).map_err(ser)?;

    Ok(ExamDefinition {
        id: ExamId::new(row.try_get::<String, _>("id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        year: u16_from_i64("year", row.try_get::<i64, _>("year").map_err(ser)?)?,
        duration_minutes: u32_from_i64(
            "duration_minutes",
            row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
        )?,
        exercises,
    })
}
