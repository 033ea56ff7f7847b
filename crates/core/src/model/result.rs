use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::ExamAnswer;
use crate::model::ids::ExamId;

/// Historical record of a finished attempt. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    pub exam_id: ExamId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Elapsed exam time in seconds, as reported by the caller's timer.
    pub total_time: u32,
    /// Answers in the order they were first recorded.
    pub answers: Vec<ExamAnswer>,
    /// Whole-number percentage supplied by the caller, stored as given.
    /// Fractional scores are rounded by the caller before finishing.
    pub score: u32,
}
