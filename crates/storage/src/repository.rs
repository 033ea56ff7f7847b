use async_trait::async_trait;
use brevet_core::model::{ExamDefinition, ExamId, TrackerState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the tracker snapshot is stored unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "brevet-exam-session";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read/write access to the annales catalog.
#[async_trait]
pub trait ExamCatalog: Send + Sync {
    /// Fetch an exam definition by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures. A missing id is `Ok(None)`.
    async fn get_exam(&self, id: &ExamId) -> Result<Option<ExamDefinition>, StorageError>;

    /// All definitions, most recent year first, then by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_exams(&self) -> Result<Vec<ExamDefinition>, StorageError>;

    /// Insert or replace a definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the definition cannot be stored.
    async fn upsert_exam(&self, exam: &ExamDefinition) -> Result<(), StorageError>;
}

/// Durable key-value storage for the full tracker snapshot (session + history).
#[async_trait]
pub trait TrackerStateRepository: Send + Sync {
    /// Load the snapshot stored under `namespace`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored payload cannot be decoded.
    async fn load_state(&self, namespace: &str) -> Result<Option<TrackerState>, StorageError>;

    /// Replace the snapshot stored under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save_state(&self, namespace: &str, state: &TrackerState) -> Result<(), StorageError>;
}

pub(crate) fn sort_catalog(exams: &mut [ExamDefinition]) {
    exams.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory repository for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    exams: Arc<Mutex<HashMap<ExamId, ExamDefinition>>>,
    states: Arc<Mutex<HashMap<String, TrackerState>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository whose catalog already holds `exams`.
    #[must_use]
    pub fn with_exams(exams: impl IntoIterator<Item = ExamDefinition>) -> Self {
        let map = exams.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            exams: Arc::new(Mutex::new(map)),
            states: Arc::default(),
        }
    }
}

#[async_trait]
impl ExamCatalog for InMemoryRepository {
    async fn get_exam(&self, id: &ExamId) -> Result<Option<ExamDefinition>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_exams(&self) -> Result<Vec<ExamDefinition>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut exams: Vec<_> = guard.values().cloned().collect();
        sort_catalog(&mut exams);
        Ok(exams)
    }

    async fn upsert_exam(&self, exam: &ExamDefinition) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(exam.id.clone(), exam.clone());
        Ok(())
    }
}

#[async_trait]
impl TrackerStateRepository for InMemoryRepository {
    async fn load_state(&self, namespace: &str) -> Result<Option<TrackerState>, StorageError> {
        let guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(namespace).cloned())
    }

    async fn save_state(&self, namespace: &str, state: &TrackerState) -> Result<(), StorageError> {
        let mut guard = self
            .states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(namespace.to_owned(), state.clone());
        Ok(())
    }
}

/// Aggregates the catalog and state repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn ExamCatalog>,
    pub states: Arc<dyn TrackerStateRepository>,
}

impl Storage {
    /// Both repositories backed by one empty `InMemoryRepository`.
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn ExamCatalog> = Arc::new(repo.clone());
        let states: Arc<dyn TrackerStateRepository> = Arc::new(repo);
        Self { catalog, states }
    }
}
