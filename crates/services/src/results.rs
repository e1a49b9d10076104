use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{ExamDocument, ExamResult};
use exam_core::scoring::{AttemptRecord, ScoreCard, merge_attempt, score_answers};
use storage::{ExamStateRepository, ResultRepository};

use crate::attempt::ExamAttempt;
use crate::error::ResultServiceError;

/// Everything the results panel shows after a submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub result: ExamResult,
    pub card: ScoreCard,
    pub document: Arc<ExamDocument>,
    /// Set when the countdown forced the submission.
    pub timed_out: bool,
}

impl SubmissionOutcome {
    /// `"{score} / {total}"`.
    #[must_use]
    pub fn raw_score(&self) -> String {
        format!("{} / {}", self.card.score, self.card.total)
    }

    #[must_use]
    pub fn comment(&self) -> String {
        let mut comment = if self.card.is_perfect() {
            "Perfect!".to_string()
        } else {
            "Review your answers below.".to_string()
        };
        if self.result.is_repeat() {
            comment.push_str(&format!(
                " (Attempt {}, Best: {}/{})",
                self.result.attempts, self.result.best_score, self.card.total
            ));
        }
        comment
    }
}

/// Scores attempts and folds them into the stored results.
#[derive(Clone)]
pub struct ResultService {
    clock: Clock,
    results: Arc<dyn ResultRepository>,
    states: Arc<dyn ExamStateRepository>,
}

impl ResultService {
    #[must_use]
    pub fn new(
        clock: Clock,
        results: Arc<dyn ResultRepository>,
        states: Arc<dyn ExamStateRepository>,
    ) -> Self {
        Self {
            clock,
            results,
            states,
        }
    }

    /// Score `attempt`, merge it with the prior result and persist both the
    /// result and its index entry. Saved in-progress state is removed.
    ///
    /// # Errors
    ///
    /// Returns `ResultServiceError::AlreadySubmitted` for a finished attempt,
    /// or scoring and storage failures.
    pub async fn submit(
        &self,
        attempt: &mut ExamAttempt,
        timed_out: bool,
    ) -> Result<SubmissionOutcome, ResultServiceError> {
        if attempt.is_submitted() {
            return Err(ResultServiceError::AlreadySubmitted);
        }
        let now = self.clock.now();
        let card = score_answers(attempt.document(), attempt.answers(), attempt.mode())?;
        let record = AttemptRecord {
            key: attempt.key().clone(),
            mode: attempt.mode(),
            score: card.score,
            total: card.total,
            time_taken: attempt.time_taken(now),
            completed_at: now,
        };

        let prior = self.results.get_result(attempt.key()).await?;
        let result = merge_attempt(prior.as_ref(), &record);
        self.results.save_result(&result).await?;
        self.states.delete_state(attempt.key()).await?;
        attempt.finish();

        tracing::info!(
            exam = %attempt.key(),
            score = result.score,
            total = result.total,
            attempts = result.attempts,
            timed_out,
            "recorded result"
        );

        Ok(SubmissionOutcome {
            result,
            card,
            document: Arc::clone(attempt.document()),
            timed_out,
        })
    }
}
