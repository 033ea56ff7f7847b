mod answer;
mod exam;
mod ids;
mod result;
mod session;
mod stats;
mod tracker;

pub use ids::{ExamId, ParseIdError, QuestionId};

pub use answer::ExamAnswer;
pub use exam::{ExamDefinition, ExamDefinitionError, Exercise, Question};
pub use result::ExamResult;
pub use session::{ActiveExam, ExamSession, SessionStatus};
pub use stats::{ExamProgress, ExamStats};
pub use tracker::TrackerState;
