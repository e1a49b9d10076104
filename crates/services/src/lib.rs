#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_state;
pub mod attempt;
pub mod catalog;
pub mod error;
pub mod history;
pub mod preferences;
pub mod results;

pub use exam_core::Clock;

pub use app_services::{AppServices, ServiceOptions};
pub use app_state::{ExamApp, Notice};
pub use attempt::{Advance, AnswerFeedback, AttemptController, ExamAttempt, TimerStatus};
pub use catalog::{
    CatalogConfig, DirExamSource, ExamCatalog, ExamSource, HttpExamSource, YearOption,
    exam_source_for,
};
pub use error::{
    AppError, AppServicesError, AttemptError, CatalogError, LoadError, ResultServiceError,
};
pub use history::HistoryService;
pub use preferences::PreferenceService;
pub use results::{ResultService, SubmissionOutcome};
