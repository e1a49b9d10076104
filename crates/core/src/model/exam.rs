use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("exam document has no questions")]
    NoQuestions,

    #[error("question {question} has no options")]
    NoOptions { question: usize },

    #[error("question {question} marks option {correct} correct but has {options} options")]
    CorrectOutOfRange {
        question: usize,
        correct: usize,
        options: usize,
    },
}

/// A single multiple-choice question as stored in the exam document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub q: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
}

impl Question {
    /// Image sources for this question: zero, one or many.
    ///
    /// An `images` list takes precedence over a single `image`.
    #[must_use]
    pub fn image_sources(&self) -> Vec<&str> {
        if let Some(images) = self.images.as_ref() {
            return images.iter().map(String::as_str).collect();
        }
        self.image.as_deref().into_iter().collect()
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.option(self.correct)
    }

    #[must_use]
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct)
    }
}

/// Exam definition fetched per attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    pub questions: Vec<Question>,
}

impl ExamDocument {
    /// Parse and validate a document body.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Parse` for malformed JSON and the validation
    /// variants for structurally unusable documents.
    pub fn from_json(body: &str) -> Result<Self, ExamError> {
        let doc: Self = serde_json::from_str(body)?;
        doc.validate()?;
        Ok(doc)
    }

    /// # Errors
    ///
    /// Returns an `ExamError` describing the first invalid question.
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.questions.is_empty() {
            return Err(ExamError::NoQuestions);
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(ExamError::NoOptions { question: index });
            }
            if question.correct >= question.options.len() {
                return Err(ExamError::CorrectOutOfRange {
                    question: index,
                    correct: question.correct,
                    options: question.options.len(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}
