//! Raw scoring of an attempt and merging it into the stored result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ExamDocument, ExamKey, ExamMode, ExamResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("too many questions to score: {len}")]
    TooManyQuestions { len: usize },
}

/// Per-question outcome shown on the results panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub index: usize,
    pub selected: Option<usize>,
    pub correct: usize,
    /// Whether the selection matches the answer key.
    pub matches_key: bool,
    /// Whether the question was counted towards the score.
    pub counted_correct: bool,
}

/// Score of a single attempt, before merging with history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub reviews: Vec<QuestionReview>,
}

impl ScoreCard {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}

/// `round(score / total * 100)`, rounding halves up; zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Score the selected answers against the document.
///
/// Unanswered questions count as wrong. In question-by-question mode every
/// question counts as correct whatever was selected; the review still
/// records whether the selection matched the key.
///
/// # Errors
///
/// Returns `ScoreError::TooManyQuestions` if the count cannot fit in `u32`.
pub fn score_answers(
    document: &ExamDocument,
    answers: &BTreeMap<usize, usize>,
    mode: Option<ExamMode>,
) -> Result<ScoreCard, ScoreError> {
    let len = document.question_count();
    let total = u32::try_from(len).map_err(|_| ScoreError::TooManyQuestions { len })?;
    let counts_everything = mode == Some(ExamMode::QuestionByQuestion);

    let mut score = 0_u32;
    let mut reviews = Vec::with_capacity(len);
    for (index, question) in document.questions.iter().enumerate() {
        let selected = answers.get(&index).copied();
        let matches_key = question.is_correct(selected);
        let counted_correct = counts_everything || matches_key;
        if counted_correct {
            score = score.saturating_add(1);
        }
        reviews.push(QuestionReview {
            index,
            selected,
            correct: question.correct,
            matches_key,
            counted_correct,
        });
    }

    Ok(ScoreCard {
        score,
        total,
        percentage: percentage(score, total),
        reviews,
    })
}

/// One completed attempt, ready to be folded into the stored result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub key: ExamKey,
    pub mode: Option<ExamMode>,
    pub score: u32,
    pub total: u32,
    pub time_taken: Option<u64>,
    pub completed_at: DateTime<Utc>,
}

/// Fold an attempt into the prior result for the same exam.
///
/// Attempts increment (starting at 1), best score and percentage take the
/// maximum, best time takes the minimum of the known times, and every
/// last-attempt field is overwritten.
#[must_use]
pub fn merge_attempt(prior: Option<&ExamResult>, attempt: &AttemptRecord) -> ExamResult {
    let percentage = percentage(attempt.score, attempt.total);

    let (attempts, best_score, best_percentage, best_time) = match prior {
        None => (1, attempt.score, percentage, attempt.time_taken),
        Some(prior) => {
            let best_time = match (prior.best_time.or(prior.time_taken), attempt.time_taken) {
                (Some(previous), Some(current)) => Some(previous.min(current)),
                (previous, current) => previous.or(current),
            };
            (
                prior.attempts.max(1).saturating_add(1),
                prior.effective_best_score().max(attempt.score),
                prior.effective_best_percentage().max(percentage),
                best_time,
            )
        }
    };

    ExamResult {
        subject: attempt.key.subject().to_string(),
        exam_type: attempt.key.exam_type().to_string(),
        year: attempt.key.year().to_string(),
        mode: attempt.mode,
        score: attempt.score,
        total: attempt.total,
        percentage,
        best_score,
        best_percentage,
        attempts,
        timestamp: attempt.completed_at,
        last_attempt: attempt.completed_at,
        time_taken: attempt.time_taken,
        best_time,
    }
}
