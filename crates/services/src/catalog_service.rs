use std::sync::Arc;

use brevet_core::model::ExamDefinition;
use storage::repository::ExamCatalog;

use crate::error::CatalogServiceError;

/// Validates and stores annales in the catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn ExamCatalog>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn ExamCatalog>) -> Self {
        Self { catalog }
    }

    /// Validate every definition, then upsert them all.
    ///
    /// Nothing is written if any definition is invalid.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Definition` for the first invalid definition.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn import(&self, exams: &[ExamDefinition]) -> Result<usize, CatalogServiceError> {
        for exam in exams {
            exam.validate()?;
        }
        for exam in exams {
            self.catalog.upsert_exam(exam).await?;
        }
        tracing::info!(count = exams.len(), "imported exam definitions");
        Ok(exams.len())
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list(&self) -> Result<Vec<ExamDefinition>, CatalogServiceError> {
        Ok(self.catalog.list_exams().await?)
    }
}
