use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::ExamAnswer;
use crate::model::ids::{ExamId, QuestionId};

/// Identity of the attempt in progress. Exam id and start time are only ever set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveExam {
    pub exam_id: ExamId,
    pub started_at: DateTime<Utc>,
}

/// Derived lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Active,
    Paused,
}

/// Working state of the current exam attempt.
///
/// The default value is the idle session. Answers keep their first-insertion
/// order and hold at most one record per question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    active: Option<ActiveExam>,
    answers: Vec<ExamAnswer>,
    current_exercise_index: usize,
    is_paused: bool,
    elapsed_time: u32,
}

impl ExamSession {
    /// Fresh session for `exam_id`, started at `started_at`.
    #[must_use]
    pub fn started(exam_id: ExamId, started_at: DateTime<Utc>) -> Self {
        Self {
            active: Some(ActiveExam {
                exam_id,
                started_at,
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveExam> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn current_exam_id(&self) -> Option<&ExamId> {
        self.active.as_ref().map(|a| &a.exam_id)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.started_at)
    }

    #[must_use]
    pub fn answers(&self) -> &[ExamAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, question_id: &QuestionId) -> Option<&ExamAnswer> {
        self.answers.iter().find(|a| &a.question_id == question_id)
    }

    #[must_use]
    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[must_use]
    pub fn elapsed_time(&self) -> u32 {
        self.elapsed_time
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match (&self.active, self.is_paused) {
            (None, _) => SessionStatus::Idle,
            (Some(_), false) => SessionStatus::Active,
            (Some(_), true) => SessionStatus::Paused,
        }
    }

    /// Replaces or appends the record for `answer.question_id`, keeping its slot.
    pub(crate) fn upsert(&mut self, answer: ExamAnswer) {
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(slot) => *slot = answer,
            None => self.answers.push(answer),
        }
    }

    pub(crate) fn set_current_exercise(&mut self, index: usize) {
        self.current_exercise_index = index;
    }

    pub(crate) fn set_elapsed_time(&mut self, seconds: u32) {
        self.elapsed_time = seconds;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn default_session_is_idle() {
        let session = ExamSession::default();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.current_exam_id().is_none());
        assert!(session.started_at().is_none());
    }

    #[test]
    fn status_tracks_pause_flag() {
        let mut session = ExamSession::started(ExamId::new("e"), fixed_now());
        assert_eq!(session.status(), SessionStatus::Active);
        session.set_paused(true);
        assert_eq!(session.status(), SessionStatus::Paused);
    }

    #[test]
    fn upsert_keeps_insertion_order() {
        let mut session = ExamSession::default();
        for id in ["b", "a", "c"] {
            session.upsert(ExamAnswer::with_answer(None, QuestionId::new(id), "x", 0));
        }
        session.upsert(ExamAnswer::with_answer(None, QuestionId::new("a"), "y", 0));

        let order: Vec<_> = session.answers().iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
        assert_eq!(session.answer(&QuestionId::new("a")).unwrap().answer, "y");
    }
}
