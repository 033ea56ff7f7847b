use thiserror::Error;

use services::{CatalogServiceError, TrackerError};
use storage::sqlite::SqliteInitError;

/// Everything that can stop the binary. Printed once in `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid database url: {0}")]
    InvalidDbUrl(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
}
