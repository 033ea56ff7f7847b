use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// The student's current answer to one question of the active exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAnswer {
    pub question_id: QuestionId,
    pub answer: String,
    /// Elapsed exam time (seconds) when the question was first touched.
    pub time_spent: u32,
    pub flagged: bool,
}

impl ExamAnswer {
    /// Merges a new answer text into an existing record.
    ///
    /// Defaults for a new record: `time_spent = elapsed`, `flagged = false`.
    /// An existing record keeps its `time_spent` and `flagged`.
    #[must_use]
    pub fn with_answer(
        existing: Option<&ExamAnswer>,
        question_id: QuestionId,
        answer: impl Into<String>,
        elapsed: u32,
    ) -> Self {
        Self {
            question_id,
            answer: answer.into(),
            time_spent: existing.map_or(elapsed, |a| a.time_spent),
            flagged: existing.is_some_and(|a| a.flagged),
        }
    }

    /// Flips the flag on a record.
    ///
    /// Defaults for a new record: `answer = ""`, `time_spent = 0`, so the first
    /// toggle always yields `flagged = true`.
    #[must_use]
    pub fn with_flag_toggled(existing: Option<&ExamAnswer>, question_id: QuestionId) -> Self {
        Self {
            question_id,
            answer: existing.map(|a| a.answer.clone()).unwrap_or_default(),
            time_spent: existing.map_or(0, |a| a.time_spent),
            flagged: !existing.is_some_and(|a| a.flagged),
        }
    }

    /// True when the answer holds something other than whitespace.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}
