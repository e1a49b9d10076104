//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{ExamError, KeyError, SessionError};
use exam_core::navigation::NavigationError;
use exam_core::scoring::ScoreError;
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while fetching an exam document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("exam {key} is not available")]
    Unavailable { key: String },
    #[error("fetching {path} failed with status {status}")]
    Status { path: String, status: u16 },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ExamError),
}

/// Errors emitted by `ExamCatalog` when listing years.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AttemptController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("the exam is paused")]
    Paused,
    #[error("question {question} is already answered")]
    Locked { question: usize },
    #[error("question {question} does not exist")]
    NoSuchQuestion { question: usize },
    #[error("question {question} has no option {option}")]
    NoSuchOption { question: usize, option: usize },
    #[error("this attempt is not timed")]
    NotTimed,
    #[error("this attempt was already submitted")]
    Finished,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultServiceError {
    #[error("this attempt was already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors surfaced by `ExamApp`; the display text is what the user sees.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("The exam for {year} is not available. Please select an available exam.")]
    YearUnavailable { year: String },
    #[error("Exam data could not be loaded!")]
    Load(#[from] LoadError),
    #[error("Please finish selecting a subject, type and year first.")]
    IncompleteSession,
    #[error("No exam is in progress.")]
    NoAttempt,
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Results(#[from] ResultServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
