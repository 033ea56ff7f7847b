use crate::model::result::ExamResult;

/// Progress through the active exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExamProgress {
    pub answered: usize,
    pub total: usize,
    pub flagged: usize,
}

/// Aggregates over the recorded attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExamStats {
    pub total_exams: usize,
    /// Mean score rounded half away from zero.
    pub average_score: u32,
    pub best_score: u32,
}

impl ExamStats {
    /// Computes stats over `history`. An empty history yields all zeros.
    #[must_use]
    pub fn from_history(history: &[ExamResult]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let sum: u64 = history.iter().map(|r| u64::from(r.score)).sum();
        let count = history.len() as u64;
        // Integer round-half-up of sum / count.
        let average = (2 * sum + count) / (2 * count);

        Self {
            total_exams: history.len(),
            average_score: u32::try_from(average).unwrap_or(u32::MAX),
            best_score: history.iter().map(|r| r.score).max().unwrap_or(0),
        }
    }
}
