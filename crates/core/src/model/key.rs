use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} contains unsupported characters: {value:?}")]
    InvalidSegment { field: &'static str, value: String },
}

/// Trim and lowercase a selection value, rejecting anything that cannot be
/// used as a path segment or storage-key fragment.
///
/// # Errors
///
/// Returns `KeyError::Empty` for blank input and `KeyError::InvalidSegment`
/// for characters outside `[a-z0-9_-]`.
pub fn normalize_segment(field: &'static str, raw: &str) -> Result<String, KeyError> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return Err(KeyError::Empty { field });
    }
    let valid = value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        return Err(KeyError::InvalidSegment { field, value });
    }
    Ok(value)
}

/// Identifies one exam paper: `(subject, type, year)`.
///
/// All segments are normalized, so two keys built from differently cased
/// input compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExamKey {
    subject: String,
    exam_type: String,
    year: String,
}

impl ExamKey {
    /// # Errors
    ///
    /// Returns `KeyError` if any segment is empty or not path-safe.
    pub fn new(subject: &str, exam_type: &str, year: &str) -> Result<Self, KeyError> {
        Ok(Self {
            subject: normalize_segment("subject", subject)?,
            exam_type: normalize_segment("type", exam_type)?,
            year: normalize_segment("year", year)?,
        })
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

    /// Relative location of the exam document: `exams/{subject}/{type}/{year}.json`.
    #[must_use]
    pub fn document_path(&self) -> String {
        format!("exams/{}/{}/{}.json", self.subject, self.exam_type, self.year)
    }

    /// Suffix shared by the per-exam storage keys.
    #[must_use]
    pub fn storage_suffix(&self) -> String {
        format!("{}_{}_{}", self.subject, self.exam_type, self.year)
    }

    /// Display title, e.g. `PHYSICS FINAL - 2024`.
    #[must_use]
    pub fn title(&self) -> String {
        format!(
            "{} {} - {}",
            self.subject.to_uppercase(),
            self.exam_type.to_uppercase(),
            self.year
        )
    }
}

impl fmt::Display for ExamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.subject, self.exam_type, self.year)
    }
}
