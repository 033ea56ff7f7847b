use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::ExamAnswer;
use crate::model::exam::ExamDefinition;
use crate::model::ids::{ExamId, QuestionId};
use crate::model::result::ExamResult;
use crate::model::session::{ExamSession, SessionStatus};
use crate::model::stats::{ExamProgress, ExamStats};

/// Everything the tracker persists: the working session plus the history of finished attempts.
///
/// All transitions are total. Unknown ids, missing records and idle sessions
/// degrade to no-ops or zero-valued results instead of errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    session: ExamSession,
    history: Vec<ExamResult>,
}

impl TrackerState {
    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    /// Finished attempts, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ExamResult] {
        &self.history
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Starts `exam` at `now`, discarding any unfinished session.
    pub fn start_exam(&mut self, exam: &ExamDefinition, now: DateTime<Utc>) {
        self.session = ExamSession::started(exam.id.clone(), now);
    }

    /// Records or revises the answer to `question_id`.
    pub fn save_answer(&mut self, question_id: QuestionId, answer: impl Into<String>) {
        let merged = ExamAnswer::with_answer(
            self.session.answer(&question_id),
            question_id,
            answer,
            self.session.elapsed_time(),
        );
        self.session.upsert(merged);
    }

    /// Flips the review flag on `question_id`, creating an empty record if needed.
    pub fn toggle_flag(&mut self, question_id: QuestionId) {
        let merged = ExamAnswer::with_flag_toggled(self.session.answer(&question_id), question_id);
        self.session.upsert(merged);
    }

    /// Bounds are the caller's concern.
    pub fn set_current_exercise(&mut self, index: usize) {
        self.session.set_current_exercise(index);
    }

    pub fn update_elapsed_time(&mut self, seconds: u32) {
        self.session.set_elapsed_time(seconds);
    }

    pub fn pause_exam(&mut self) {
        self.session.set_paused(true);
    }

    pub fn resume_exam(&mut self) {
        self.session.set_paused(false);
    }

    /// Closes the active attempt, appending it to the history.
    ///
    /// Returns `None` and leaves the state untouched when no exam is active.
    /// `score` is stored as given.
    pub fn finish_exam(&mut self, score: u32, now: DateTime<Utc>) -> Option<ExamResult> {
        let active = self.session.active()?;

        let result = ExamResult {
            exam_id: active.exam_id.clone(),
            started_at: active.started_at,
            completed_at: now,
            total_time: self.session.elapsed_time(),
            answers: self.session.answers().to_vec(),
            score,
        };

        self.history.push(result.clone());
        self.session = ExamSession::default();
        Some(result)
    }

    /// Drops the working session without touching the history.
    pub fn cancel_exam(&mut self) {
        self.session = ExamSession::default();
    }

    /// Progress against `exam`, the caller's lookup of the active exam id.
    ///
    /// Idle sessions report zeros even if stale answers linger.
    #[must_use]
    pub fn exam_progress(&self, exam: Option<&ExamDefinition>) -> ExamProgress {
        if self.session.active().is_none() {
            return ExamProgress::default();
        }

        let answers = self.session.answers();
        ExamProgress {
            answered: answers.iter().filter(|a| a.is_answered()).count(),
            total: exam.map_or(0, ExamDefinition::question_count),
            flagged: answers.iter().filter(|a| a.flagged).count(),
        }
    }

    #[must_use]
    pub fn exam_stats(&self) -> ExamStats {
        ExamStats::from_history(&self.history)
    }

    #[must_use]
    pub fn current_exam_id(&self) -> Option<&ExamId> {
        self.session.current_exam_id()
    }
}
