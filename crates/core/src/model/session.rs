use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::key::{ExamKey, KeyError, normalize_segment};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("unknown exam mode: {0}")]
    UnknownMode(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// How an exam is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamMode {
    /// Every question at once, under a countdown, feedback after submission.
    #[serde(rename = "full")]
    Full,
    /// One question at a time with immediate feedback.
    #[serde(rename = "qbq")]
    QuestionByQuestion,
}

impl ExamMode {
    pub const ALL: [ExamMode; 2] = [ExamMode::Full, ExamMode::QuestionByQuestion];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExamMode::Full => "full",
            ExamMode::QuestionByQuestion => "qbq",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExamMode::Full => "Full exam",
            ExamMode::QuestionByQuestion => "Question by question",
        }
    }

    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, ExamMode::Full)
    }
}

impl fmt::Display for ExamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ExamMode::Full),
            "qbq" | "question" | "question-by-question" => Ok(ExamMode::QuestionByQuestion),
            other => Err(SessionError::UnknownMode(other.to_string())),
        }
    }
}

/// The user's current subject/type/year/mode selection.
///
/// Values are lowercased on write. Changing an earlier selection clears the
/// later ones so a stale year can never pair with a new subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    subject: String,
    #[serde(default, rename = "type")]
    exam_type: String,
    #[serde(default)]
    year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<ExamMode>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `SessionError::Key` if the subject is blank or not path-safe.
    pub fn set_subject(&mut self, raw: &str) -> Result<(), SessionError> {
        self.subject = normalize_segment("subject", raw)?;
        self.exam_type.clear();
        self.year.clear();
        self.mode = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Key` if the type is blank or not path-safe.
    pub fn set_exam_type(&mut self, raw: &str) -> Result<(), SessionError> {
        self.exam_type = normalize_segment("type", raw)?;
        self.year.clear();
        self.mode = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Key` if the year is blank or not path-safe.
    pub fn set_year(&mut self, raw: &str) -> Result<(), SessionError> {
        self.year = normalize_segment("year", raw)?;
        self.mode = None;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ExamMode) {
        self.mode = Some(mode);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn exam_type(&self) -> &str {
        &self.exam_type
    }

    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    #[must_use]
    pub fn mode(&self) -> Option<ExamMode> {
        self.mode
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
            && self.exam_type.is_empty()
            && self.year.is_empty()
            && self.mode.is_none()
    }

    #[must_use]
    pub fn has_subject_and_type(&self) -> bool {
        !self.subject.is_empty() && !self.exam_type.is_empty()
    }

    /// Key for a subject/type pair and an arbitrary candidate year.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` if subject or type are unset or the year is invalid.
    pub fn key_for_year(&self, year: &str) -> Result<ExamKey, KeyError> {
        ExamKey::new(&self.subject, &self.exam_type, year)
    }

    /// Key of the selected exam, if subject, type and year are all set.
    #[must_use]
    pub fn key(&self) -> Option<ExamKey> {
        ExamKey::new(&self.subject, &self.exam_type, &self.year).ok()
    }
}
