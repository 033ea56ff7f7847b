//! Shared error types for the services crate.

use thiserror::Error;

use brevet_core::model::{ExamDefinitionError, ExamResult};
use storage::repository::StorageError;

/// Errors emitted by `ExamSessionTracker`.
///
/// Domain transitions never fail; only the persistence layer can. When a save
/// fails the transition has still been applied in memory, so calling
/// `ExamSessionTracker::save` again retries the write.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The attempt was recorded in memory but the snapshot write failed.
    #[error("exam {} finished with score {} but was not saved: {source}", .result.exam_id, .result.score)]
    FinishedUnsaved {
        result: Box<ExamResult>,
        source: StorageError,
    },
}

impl TrackerError {
    /// The finished attempt carried by `FinishedUnsaved`, if any.
    #[must_use]
    pub fn unsaved_result(&self) -> Option<&ExamResult> {
        match self {
            Self::FinishedUnsaved { result, .. } => Some(&**result),
            Self::Storage(_) => None,
        }
    }
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Definition(#[from] ExamDefinitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
