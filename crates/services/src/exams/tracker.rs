use std::fmt;
use std::sync::Arc;

use brevet_core::model::{
    ExamDefinition, ExamId, ExamProgress, ExamResult, ExamSession, ExamStats, QuestionId,
    SessionStatus, TrackerState,
};
use storage::repository::{DEFAULT_NAMESPACE, ExamCatalog, TrackerStateRepository};

use crate::Clock;
use crate::error::TrackerError;

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Owns one exam attempt at a time plus the history of finished attempts.
///
/// Each mutating call applies the transition to the in-memory `TrackerState`
/// and then writes the whole snapshot through `save`. Transitions that change
/// nothing (unknown exam id, finishing while idle) skip the write. A failed
/// write leaves the transition applied; `save` can be called again to retry.
pub struct ExamSessionTracker {
    clock: Clock,
    namespace: String,
    catalog: Arc<dyn ExamCatalog>,
    states: Arc<dyn TrackerStateRepository>,
    state: TrackerState,
}

impl ExamSessionTracker {
    /// Restore the tracker persisted under the default namespace.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the snapshot cannot be read.
    pub async fn restore(
        clock: Clock,
        catalog: Arc<dyn ExamCatalog>,
        states: Arc<dyn TrackerStateRepository>,
    ) -> Result<Self, TrackerError> {
        Self::restore_in(DEFAULT_NAMESPACE, clock, catalog, states).await
    }

    /// Restore the tracker persisted under `namespace`, or start empty.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the snapshot cannot be read.
    pub async fn restore_in(
        namespace: impl Into<String>,
        clock: Clock,
        catalog: Arc<dyn ExamCatalog>,
        states: Arc<dyn TrackerStateRepository>,
    ) -> Result<Self, TrackerError> {
        let namespace = namespace.into();
        let state = states.load_state(&namespace).await?.unwrap_or_default();
        tracing::debug!(
            namespace = %namespace,
            history = state.history().len(),
            status = ?state.status(),
            "tracker restored"
        );
        Ok(Self {
            clock,
            namespace,
            catalog,
            states,
            state,
        })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        self.state.session()
    }

    /// Finished attempts, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ExamResult] {
        self.state.history()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Write the current snapshot to the state repository.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the write fails.
    pub async fn save(&self) -> Result<(), TrackerError> {
        self.states.save_state(&self.namespace, &self.state).await?;
        Ok(())
    }

    /// Start `exam_id`, replacing any unfinished attempt.
    ///
    /// Returns the definition that was started, or `None` (state untouched) if the
    /// catalog does not know the id.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the lookup or the save fails.
    pub async fn start_exam(
        &mut self,
        exam_id: &ExamId,
    ) -> Result<Option<ExamDefinition>, TrackerError> {
        let Some(exam) = self.catalog.get_exam(exam_id).await? else {
            tracing::warn!(exam_id = %exam_id, "start ignored: exam not in catalog");
            return Ok(None);
        };

        if let Some(previous) = self.state.current_exam_id() {
            tracing::debug!(previous = %previous, "discarding unfinished attempt");
        }
        self.state.start_exam(&exam, self.clock.now());
        self.save().await?;
        tracing::info!(exam_id = %exam_id, "exam started");
        Ok(Some(exam))
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn save_answer(
        &mut self,
        question_id: QuestionId,
        answer: impl Into<String>,
    ) -> Result<(), TrackerError> {
        tracing::debug!(question_id = %question_id, "answer saved");
        self.state.save_answer(question_id, answer);
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn toggle_flag(&mut self, question_id: QuestionId) -> Result<(), TrackerError> {
        tracing::debug!(question_id = %question_id, "flag toggled");
        self.state.toggle_flag(question_id);
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn set_current_exercise(&mut self, index: usize) -> Result<(), TrackerError> {
        self.state.set_current_exercise(index);
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn update_elapsed_time(&mut self, seconds: u32) -> Result<(), TrackerError> {
        self.state.update_elapsed_time(seconds);
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn pause_exam(&mut self) -> Result<(), TrackerError> {
        self.state.pause_exam();
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn resume_exam(&mut self) -> Result<(), TrackerError> {
        self.state.resume_exam();
        self.save().await
    }

    /// Record the active attempt with `score` and return to idle.
    ///
    /// Returns `None` without writing anything when no exam is active.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::FinishedUnsaved` if the save fails. The error
    /// carries the recorded result, which is already in `history`.
    pub async fn finish_exam(&mut self, score: u32) -> Result<Option<ExamResult>, TrackerError> {
        let Some(result) = self.state.finish_exam(score, self.clock.now()) else {
            tracing::debug!("finish ignored: no active exam");
            return Ok(None);
        };

        if let Err(source) = self.states.save_state(&self.namespace, &self.state).await {
            tracing::warn!(
                exam_id = %result.exam_id,
                error = %source,
                "finished exam not persisted"
            );
            return Err(TrackerError::FinishedUnsaved {
                result: Box::new(result),
                source,
            });
        }
        tracing::info!(
            exam_id = %result.exam_id,
            score = result.score,
            total_time = result.total_time,
            "exam finished"
        );
        Ok(Some(result))
    }

    /// Drop the working session without recording it.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the save fails.
    pub async fn cancel_exam(&mut self) -> Result<(), TrackerError> {
        if let Some(exam_id) = self.state.current_exam_id() {
            tracing::info!(exam_id = %exam_id, "exam cancelled");
        }
        self.state.cancel_exam();
        self.save().await
    }

    /// Definition of the active exam. `None` when idle.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the catalog lookup fails.
    pub async fn current_annale(&self) -> Result<Option<ExamDefinition>, TrackerError> {
        match self.state.current_exam_id() {
            Some(exam_id) => Ok(self.catalog.get_exam(exam_id).await?),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the catalog lookup fails.
    pub async fn exam_progress(&self) -> Result<ExamProgress, TrackerError> {
        let exam = self.current_annale().await?;
        Ok(self.state.exam_progress(exam.as_ref()))
    }

    #[must_use]
    pub fn exam_stats(&self) -> ExamStats {
        self.state.exam_stats()
    }
}

impl fmt::Debug for ExamSessionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSessionTracker")
            .field("namespace", &self.namespace)
            .field("clock", &self.clock)
            .field("status", &self.state.status())
            .field("current_exam_id", &self.state.current_exam_id())
            .field("history_len", &self.state.history().len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use brevet_core::model::{Exercise, Question};
    use async_trait::async_trait;
    use brevet_core::time::fixed_now;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{InMemoryRepository, StorageError};

    /// State repository whose writes can be switched off.
    #[derive(Clone, Default)]
    struct UnreliableStates {
        inner: InMemoryRepository,
        failing: Arc<AtomicBool>,
    }

    impl UnreliableStates {
        fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TrackerStateRepository for UnreliableStates {
        async fn load_state(&self, namespace: &str) -> Result<Option<TrackerState>, StorageError> {
            self.inner.load_state(namespace).await
        }

        async fn save_state(&self, namespace: &str, state: &TrackerState) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("disk full".into()));
            }
            self.inner.save_state(namespace, state).await
        }
    }

    fn annale(id: &str, shape: &[usize]) -> ExamDefinition {
        ExamDefinition {
            id: ExamId::new(id),
            title: format!("Annale {id}"),
            year: 2024,
            duration_minutes: 120,
            exercises: shape
                .iter()
                .enumerate()
                .map(|(i, n)| Exercise {
                    id: format!("ex{}", i + 1),
                    title: String::new(),
                    points: 20,
                    questions: (0..*n)
                        .map(|k| Question {
                            id: QuestionId::new(format!("{}.{}", i + 1, k + 1)),
                            statement: String::new(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    async fn tracker(repo: &InMemoryRepository) -> ExamSessionTracker {
        ExamSessionTracker::restore(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .await
        .unwrap()
    }

    fn repo() -> InMemoryRepository {
        InMemoryRepository::with_exams([annale("metropole-2024", &[3, 2]), annale("asie-2023", &[1])])
    }

    #[tokio::test]
    async fn restore_without_snapshot_is_idle() {
        let repo = repo();
        let tracker = tracker(&repo).await;
        assert_eq!(tracker.status(), SessionStatus::Idle);
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.namespace(), DEFAULT_NAMESPACE);
    }

    #[tokio::test]
    async fn unknown_exam_leaves_state_untouched() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;
        tracker
            .start_exam(&ExamId::new("metropole-2024"))
            .await
            .unwrap();
        tracker
            .save_answer(QuestionId::new("1.1"), "3/4")
            .await
            .unwrap();
        let before = tracker.state().clone();

        let started = tracker.start_exam(&ExamId::new("nope")).await.unwrap();

        assert!(started.is_none());
        assert_eq!(tracker.state(), &before);
        assert_eq!(repo.load_state(DEFAULT_NAMESPACE).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn start_stamps_clock_and_persists() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;

        let started = tracker
            .start_exam(&ExamId::new("asie-2023"))
            .await
            .unwrap()
            .expect("known exam");

        assert_eq!(started.id, ExamId::new("asie-2023"));
        assert_eq!(tracker.session().started_at(), Some(fixed_now()));
        assert_eq!(tracker.status(), SessionStatus::Active);

        let persisted = repo.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(&persisted, tracker.state());
    }

    #[tokio::test]
    async fn every_mutation_is_saved() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;
        tracker
            .start_exam(&ExamId::new("metropole-2024"))
            .await
            .unwrap();

        tracker.update_elapsed_time(45).await.unwrap();
        tracker.save_answer(QuestionId::new("1.2"), "x = 2").await.unwrap();
        tracker.toggle_flag(QuestionId::new("2.1")).await.unwrap();
        tracker.set_current_exercise(1).await.unwrap();
        tracker.pause_exam().await.unwrap();

        let persisted = repo.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(&persisted, tracker.state());
        assert_eq!(persisted.status(), SessionStatus::Paused);
        assert_eq!(persisted.session().current_exercise_index(), 1);
        assert_eq!(
            persisted.session().answer(&QuestionId::new("1.2")).unwrap().time_spent,
            45
        );

        tracker.resume_exam().await.unwrap();
        let persisted = repo.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(persisted.status(), SessionStatus::Active);
    }

    #[tokio::test]
    async fn progress_uses_catalog_totals() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;
        assert_eq!(tracker.exam_progress().await.unwrap(), ExamProgress::default());

        tracker
            .start_exam(&ExamId::new("metropole-2024"))
            .await
            .unwrap();
        tracker.save_answer(QuestionId::new("1.1"), "5").await.unwrap();
        tracker.save_answer(QuestionId::new("1.2"), "  ").await.unwrap();
        tracker.toggle_flag(QuestionId::new("2.2")).await.unwrap();

        assert_eq!(
            tracker.exam_progress().await.unwrap(),
            ExamProgress {
                answered: 1,
                total: 5,
                flagged: 1,
            }
        );
        assert_eq!(
            tracker.current_annale().await.unwrap().map(|e| e.id),
            Some(ExamId::new("metropole-2024"))
        );
    }

    #[tokio::test]
    async fn finish_appends_history_and_returns_to_idle() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;

        assert!(tracker.finish_exam(90).await.unwrap().is_none());
        assert!(repo.load_state(DEFAULT_NAMESPACE).await.unwrap().is_none());

        tracker.start_exam(&ExamId::new("asie-2023")).await.unwrap();
        tracker.update_elapsed_time(1200).await.unwrap();
        let result = tracker.finish_exam(75).await.unwrap().expect("active exam");

        assert_eq!(result.total_time, 1200);
        assert_eq!(result.completed_at, fixed_now());
        assert_eq!(tracker.session(), &ExamSession::default());
        assert_eq!(tracker.history().len(), 1);
        assert!(tracker.current_annale().await.unwrap().is_none());

        let persisted = repo.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(persisted.history(), &[result]);
    }

    #[tokio::test]
    async fn cancel_keeps_history() {
        let repo = repo();
        let mut tracker = tracker(&repo).await;
        tracker.start_exam(&ExamId::new("asie-2023")).await.unwrap();
        tracker.finish_exam(60).await.unwrap();
        tracker.start_exam(&ExamId::new("asie-2023")).await.unwrap();

        tracker.cancel_exam().await.unwrap();

        assert_eq!(tracker.status(), SessionStatus::Idle);
        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.exam_stats().total_exams, 1);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let repo = repo();
        let mut first = ExamSessionTracker::restore_in(
            "student-a",
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .await
        .unwrap();
        first.start_exam(&ExamId::new("asie-2023")).await.unwrap();

        let second = ExamSessionTracker::restore_in(
            "student-b",
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .await
        .unwrap();
        assert_eq!(second.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn failed_finish_still_hands_back_the_result() {
        let repo = repo();
        let states = UnreliableStates::default();
        let mut tracker = ExamSessionTracker::restore(
            Clock::fixed(fixed_now()),
            Arc::new(repo),
            Arc::new(states.clone()),
        )
        .await
        .unwrap();
        tracker.start_exam(&ExamId::new("asie-2023")).await.unwrap();
        tracker.update_elapsed_time(300).await.unwrap();

        states.fail_writes(true);
        let err = tracker.finish_exam(70).await.unwrap_err();

        let result = err.unsaved_result().cloned().expect("result carried by error");
        assert!(matches!(err, TrackerError::FinishedUnsaved { .. }));
        assert_eq!(result.score, 70);
        assert_eq!(result.total_time, 300);
        assert_eq!(tracker.history(), &[result.clone()]);
        assert!(tracker.finish_exam(70).await.unwrap().is_none());
        assert_eq!(tracker.history().len(), 1);

        states.fail_writes(false);
        tracker.save().await.unwrap();
        let persisted = states.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(persisted.history(), &[result]);
    }

    #[tokio::test]
    async fn failed_save_keeps_transition_for_retry() {
        let repo = repo();
        let states = UnreliableStates::default();
        let mut tracker = ExamSessionTracker::restore(
            Clock::fixed(fixed_now()),
            Arc::new(repo),
            Arc::new(states.clone()),
        )
        .await
        .unwrap();
        tracker
            .start_exam(&ExamId::new("metropole-2024"))
            .await
            .unwrap();

        states.fail_writes(true);
        let err = tracker
            .save_answer(QuestionId::new("1.1"), "42")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert!(err.unsaved_result().is_none());
        assert!(tracker.session().answer(&QuestionId::new("1.1")).is_some());

        states.fail_writes(false);
        tracker.save().await.unwrap();
        let persisted = states.load_state(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert_eq!(&persisted, tracker.state());
    }
}
