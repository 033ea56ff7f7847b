#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod error;
pub mod exams;

pub use brevet_core::Clock;

pub use catalog_service::CatalogService;
pub use error::{CatalogServiceError, TrackerError};
pub use exams::ExamSessionTracker;
