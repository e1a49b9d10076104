use services::{AppError, AttemptError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Message meant for the user as-is.
    Alert(String),
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ViewError::Alert(message) => message,
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&AppError> for ViewError {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::YearUnavailable { .. }
            | AppError::Load(_)
            | AppError::IncompleteSession
            | AppError::NoAttempt => ViewError::Alert(err.to_string()),
            AppError::Attempt(AttemptError::Paused) => {
                ViewError::Alert("The exam is paused. Resume it to keep answering.".into())
            }
            AppError::Attempt(AttemptError::Locked { .. }) => {
                ViewError::Alert("That question is already answered.".into())
            }
            _ => ViewError::Unknown,
        }
    }
}
