mod tracker;

// Public API of the exam subsystem.
pub use crate::error::TrackerError;
pub use brevet_core::{format_duration, remaining_time};
pub use tracker::ExamSessionTracker;
