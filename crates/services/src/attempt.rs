//! A running exam attempt and the controller that drives its timer and persistence.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use exam_core::Clock;
use exam_core::model::{ExamDocument, ExamKey, ExamMode, ExamState};
use exam_core::timer::{Countdown, Tick, TickEvent, TimerPolicy};
use storage::ExamStateRepository;

use crate::error::AttemptError;

/// Immediate feedback for a question answered in question-by-question mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question: usize,
    pub selected: usize,
    pub correct: usize,
}

impl AnswerFeedback {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == self.correct
    }
}

/// Result of moving the question cursor forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    /// The cursor was on the last question; the attempt should be scored.
    PastEnd,
}

/// Read-only view of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub remaining_secs: u64,
    pub duration_secs: u64,
    pub progress_percent: u8,
    pub paused: bool,
}

#[derive(Debug, Clone)]
pub struct ExamAttempt {
    key: ExamKey,
    mode: Option<ExamMode>,
    document: Arc<ExamDocument>,
    answers: BTreeMap<usize, usize>,
    locked: BTreeSet<usize>,
    cursor: usize,
    countdown: Option<Countdown>,
    submitted: bool,
}

impl ExamAttempt {
    fn new(key: ExamKey, mode: Option<ExamMode>, document: Arc<ExamDocument>) -> Self {
        Self {
            key,
            mode,
            document,
            answers: BTreeMap::new(),
            locked: BTreeSet::new(),
            cursor: 0,
            countdown: None,
            submitted: false,
        }
    }

    #[must_use]
    pub fn key(&self) -> &ExamKey {
        &self.key
    }

    #[must_use]
    pub fn mode(&self) -> Option<ExamMode> {
        self.mode
    }

    #[must_use]
    pub fn document(&self) -> &Arc<ExamDocument> {
        &self.document
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn is_one_at_a_time(&self) -> bool {
        self.mode == Some(ExamMode::QuestionByQuestion)
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.countdown.is_some()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.countdown.as_ref().is_some_and(Countdown::is_paused)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_locked(&self, question: usize) -> bool {
        self.locked.contains(&question)
    }

    /// Feedback for a locked question, if any.
    #[must_use]
    pub fn feedback(&self, question: usize) -> Option<AnswerFeedback> {
        if !self.is_locked(question) {
            return None;
        }
        let selected = self.answer(question)?;
        let correct = self.document.question(question)?.correct;
        Some(AnswerFeedback {
            question,
            selected,
            correct,
        })
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next(&mut self) -> Advance {
        if self.cursor + 1 < self.document.question_count() {
            self.cursor += 1;
            Advance::Moved(self.cursor)
        } else {
            Advance::PastEnd
        }
    }

    pub fn prev(&mut self) -> Option<usize> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.cursor)
    }

    #[must_use]
    pub fn timer_status(&self, now: DateTime<Utc>) -> Option<TimerStatus> {
        self.countdown.as_ref().map(|countdown| TimerStatus {
            remaining_secs: countdown.remaining_secs(now),
            duration_secs: countdown.duration_secs(),
            progress_percent: countdown.progress_percent(now),
            paused: countdown.is_paused(),
        })
    }

    /// Seconds spent on a timed attempt; `None` when untimed.
    #[must_use]
    pub fn time_taken(&self, now: DateTime<Utc>) -> Option<u64> {
        self.countdown.as_ref().map(|c| c.elapsed_secs(now))
    }

    /// Mark the attempt as scored. Later edits are rejected.
    pub(crate) fn finish(&mut self) {
        self.submitted = true;
    }

    fn snapshot(&self, now: DateTime<Utc>) -> Option<ExamState> {
        self.countdown
            .as_ref()
            .map(|c| {
                ExamState::from_parts(self.answers.clone(), c.started_at(), now)
                    .paused(c.paused_at())
            })
    }
}

/// Starts attempts and keeps their in-progress state in storage.
///
/// Only full-mode attempts are timed and persisted.
#[derive(Clone)]
pub struct AttemptController {
    clock: Clock,
    policy: TimerPolicy,
    states: Arc<dyn ExamStateRepository>,
}

impl AttemptController {
    #[must_use]
    pub fn new(clock: Clock, policy: TimerPolicy, states: Arc<dyn ExamStateRepository>) -> Self {
        Self {
            clock,
            policy,
            states,
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn policy(&self) -> &TimerPolicy {
        &self.policy
    }

    /// Start an attempt on a freshly loaded document.
    ///
    /// A full-mode attempt picks up persisted answers and its original start
    /// timestamp, so time keeps accruing across reloads. A saved pause is
    /// restored as a pause.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` if state cannot be read or written.
    pub async fn begin(
        &self,
        key: ExamKey,
        mode: Option<ExamMode>,
        document: Arc<ExamDocument>,
    ) -> Result<ExamAttempt, AttemptError> {
        let mut attempt = ExamAttempt::new(key, mode, document);
        if mode != Some(ExamMode::Full) {
            return Ok(attempt);
        }

        let now = self.clock.now();
        let duration = self.policy.duration_for(attempt.key.exam_type());
        match self.states.load_state(&attempt.key).await? {
            Some(state) => {
                tracing::info!(
                    exam = %attempt.key,
                    elapsed = state.elapsed_at(now),
                    "resuming saved attempt"
                );
                let started_at = state.start_time();
                let paused_at = state.paused_at();
                let document = Arc::clone(&attempt.document);
                attempt.answers = state
                    .into_answers()
                    .into_iter()
                    .filter(|(question, option)| {
                        document
                            .question(*question)
                            .is_some_and(|q| *option < q.options.len())
                    })
                    .collect();
                let mut countdown = Countdown::resume_from(duration, started_at);
                if let Some(at) = paused_at {
                    countdown.pause(at);
                }
                attempt.countdown = Some(countdown);
            }
            None => {
                attempt.countdown = Some(Countdown::start(duration, now));
                self.persist(&attempt, now).await?;
            }
        }
        Ok(attempt)
    }

    /// Record a selection.
    ///
    /// Full mode saves state right away. Question-by-question mode locks the
    /// question and returns the feedback to reveal.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` when the attempt is paused or finished, the
    /// question is locked, the indices are out of range, or saving fails.
    pub async fn select_answer(
        &self,
        attempt: &mut ExamAttempt,
        question: usize,
        option: usize,
    ) -> Result<Option<AnswerFeedback>, AttemptError> {
        if attempt.submitted {
            return Err(AttemptError::Finished);
        }
        if attempt.is_paused() {
            return Err(AttemptError::Paused);
        }
        let options = attempt
            .document
            .question(question)
            .ok_or(AttemptError::NoSuchQuestion { question })?
            .options
            .len();
        if option >= options {
            return Err(AttemptError::NoSuchOption { question, option });
        }
        if attempt.is_locked(question) {
            return Err(AttemptError::Locked { question });
        }

        attempt.answers.insert(question, option);
        if attempt.is_one_at_a_time() {
            attempt.locked.insert(question);
            return Ok(attempt.feedback(question));
        }
        self.persist(attempt, self.clock.now()).await?;
        Ok(None)
    }

    /// Advance the countdown; `None` for untimed attempts.
    ///
    /// State is saved on every running tick. An `Expired` event means the
    /// caller must submit now.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` if saving fails.
    pub async fn tick(&self, attempt: &mut ExamAttempt) -> Result<Option<Tick>, AttemptError> {
        if attempt.submitted {
            return Ok(None);
        }
        let now = self.clock.now();
        let Some(countdown) = attempt.countdown.as_mut() else {
            return Ok(None);
        };
        let tick = countdown.tick(now);
        match tick.event {
            TickEvent::Running | TickEvent::Warning => self.persist(attempt, now).await?,
            TickEvent::Expired => {
                tracing::info!(exam = %attempt.key, "time is up");
            }
            TickEvent::Paused | TickEvent::Stopped => {}
        }
        Ok(Some(tick))
    }

    /// Flip the pause flag and return whether the attempt is now paused.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotTimed` for untimed attempts, or a storage
    /// error if saving the pause or the shifted start fails.
    pub async fn toggle_pause(&self, attempt: &mut ExamAttempt) -> Result<bool, AttemptError> {
        if attempt.submitted {
            return Err(AttemptError::Finished);
        }
        let now = self.clock.now();
        let countdown = attempt.countdown.as_mut().ok_or(AttemptError::NotTimed)?;
        let was_paused = countdown.is_paused();
        if was_paused {
            countdown.resume(now);
        } else {
            countdown.pause(now);
        }

        self.persist(attempt, now).await?;
        if was_paused {
            tracing::debug!(exam = %attempt.key, "resumed");
            Ok(false)
        } else {
            tracing::debug!(exam = %attempt.key, "paused");
            Ok(true)
        }
    }

    /// Clear every answer and restart the clock from the full duration.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` if state cannot be replaced.
    pub async fn reset(&self, attempt: &mut ExamAttempt) -> Result<(), AttemptError> {
        if attempt.submitted {
            return Err(AttemptError::Finished);
        }
        let now = self.clock.now();
        attempt.answers.clear();
        attempt.locked.clear();
        attempt.cursor = 0;
        self.states.delete_state(&attempt.key).await?;
        let timed = match attempt.countdown.as_mut() {
            Some(countdown) => {
                countdown.restart(now);
                true
            }
            None => false,
        };
        if timed {
            self.persist(attempt, now).await?;
        }
        tracing::info!(exam = %attempt.key, "attempt reset");
        Ok(())
    }

    /// Drop an abandoned attempt together with its saved state.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` if the state cannot be deleted.
    pub async fn discard(&self, attempt: &ExamAttempt) -> Result<(), AttemptError> {
        if attempt.is_timed() && !attempt.submitted {
            self.states.delete_state(&attempt.key).await?;
            tracing::info!(exam = %attempt.key, "discarded attempt");
        }
        Ok(())
    }

    async fn persist(&self, attempt: &ExamAttempt, now: DateTime<Utc>) -> Result<(), AttemptError> {
        if let Some(state) = attempt.snapshot(now) {
            self.states.save_state(&attempt.key, &state).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::Question;
    use exam_core::time::fixed_now;
    use storage::Storage;

    fn document() -> Arc<ExamDocument> {
        let question = |correct| Question {
            q: "Pick".into(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct,
            image: None,
            images: None,
            passage: None,
        };
        Arc::new(ExamDocument {
            passage: None,
            questions: vec![question(0), question(2)],
        })
    }

    fn key() -> ExamKey {
        ExamKey::new("physics", "mock", "2024").unwrap()
    }

    fn controller(clock: Clock, storage: &Storage) -> AttemptController {
        AttemptController::new(clock, TimerPolicy::default(), Arc::clone(&storage.exam_states))
    }

    #[tokio::test]
    async fn full_mode_persists_each_selection() {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let ctl = controller(clock.clone(), &storage);
        let mut attempt = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        assert!(attempt.is_timed());

        ctl.select_answer(&mut attempt, 1, 2).await.unwrap();
        let saved = storage.exam_states.load_state(&key()).await.unwrap().unwrap();
        assert_eq!(saved.answers().get(&1), Some(&2));
        assert_eq!(saved.start_time(), fixed_now());

        // Full mode allows changing an answer before submission.
        ctl.select_answer(&mut attempt, 1, 0).await.unwrap();
        assert_eq!(attempt.answer(1), Some(0));
    }

    #[tokio::test]
    async fn question_by_question_reveals_and_locks() {
        let storage = Storage::in_memory();
        let ctl = controller(Clock::fixed(fixed_now()), &storage);
        let mut attempt = ctl
            .begin(key(), Some(ExamMode::QuestionByQuestion), document())
            .await
            .unwrap();
        assert!(!attempt.is_timed());

        let feedback = ctl.select_answer(&mut attempt, 0, 1).await.unwrap().unwrap();
        assert!(!feedback.is_correct());
        assert_eq!(feedback.correct, 0);

        let err = ctl.select_answer(&mut attempt, 0, 0).await.unwrap_err();
        assert!(matches!(err, AttemptError::Locked { question: 0 }));
        assert!(storage.exam_states.load_state(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cursor_reports_past_end() {
        let storage = Storage::in_memory();
        let ctl = controller(Clock::fixed(fixed_now()), &storage);
        let mut attempt = ctl
            .begin(key(), Some(ExamMode::QuestionByQuestion), document())
            .await
            .unwrap();
        assert_eq!(attempt.prev(), None);
        assert_eq!(attempt.next(), Advance::Moved(1));
        assert_eq!(attempt.next(), Advance::PastEnd);
        assert_eq!(attempt.prev(), Some(0));
    }

    #[tokio::test]
    async fn paused_attempt_rejects_answers_and_freezes_time() {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let ctl = controller(clock.clone(), &storage);
        let mut attempt = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();

        let mut moving = clock.clone();
        moving.advance(Duration::seconds(60));
        assert!(ctl.toggle_pause(&mut attempt).await.unwrap());
        let err = ctl.select_answer(&mut attempt, 0, 0).await.unwrap_err();
        assert!(matches!(err, AttemptError::Paused));

        moving.advance(Duration::seconds(600));
        let tick = ctl.tick(&mut attempt).await.unwrap().unwrap();
        assert_eq!(tick.event, TickEvent::Paused);
        assert_eq!(tick.remaining_secs, 3600 - 60);

        assert!(!ctl.toggle_pause(&mut attempt).await.unwrap());
        let saved = storage.exam_states.load_state(&key()).await.unwrap().unwrap();
        assert_eq!(saved.start_time(), fixed_now() + Duration::seconds(600));
        assert_eq!(saved.paused_at(), None);
    }

    #[tokio::test]
    async fn pause_survives_reload() {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let ctl = controller(clock.clone(), &storage);
        let mut first = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();

        let mut moving = clock.clone();
        moving.advance(Duration::seconds(60));
        assert!(ctl.toggle_pause(&mut first).await.unwrap());
        let saved = storage.exam_states.load_state(&key()).await.unwrap().unwrap();
        assert_eq!(saved.paused_at(), Some(fixed_now() + Duration::seconds(60)));
        drop(first);

        moving.advance(Duration::seconds(600));
        let mut reloaded = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        assert!(reloaded.is_paused());
        let tick = ctl.tick(&mut reloaded).await.unwrap().unwrap();
        assert_eq!(tick.event, TickEvent::Paused);
        assert_eq!(tick.remaining_secs, 3600 - 60);

        assert!(!ctl.toggle_pause(&mut reloaded).await.unwrap());
        let saved = storage.exam_states.load_state(&key()).await.unwrap().unwrap();
        assert_eq!(saved.start_time(), fixed_now() + Duration::seconds(600));
        assert_eq!(saved.paused_at(), None);
    }

    #[tokio::test]
    async fn reload_restores_answers_and_elapsed_time() {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let ctl = controller(clock.clone(), &storage);
        let mut first = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        ctl.select_answer(&mut first, 0, 0).await.unwrap();
        ctl.select_answer(&mut first, 1, 1).await.unwrap();
        drop(first);

        let mut later = clock.clone();
        later.advance(Duration::minutes(15));
        let mut resumed = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        assert_eq!(resumed.answer(0), Some(0));
        assert_eq!(resumed.answer(1), Some(1));

        let tick = ctl.tick(&mut resumed).await.unwrap().unwrap();
        assert_eq!(tick.elapsed_secs, 15 * 60);
        assert_eq!(tick.remaining_secs, 45 * 60);
    }

    #[tokio::test]
    async fn stale_answers_outside_the_document_are_dropped() {
        let storage = Storage::in_memory();
        let mut answers = BTreeMap::new();
        answers.insert(0, 1);
        answers.insert(7, 0);
        answers.insert(1, 9);
        let state = ExamState::from_parts(answers, fixed_now(), fixed_now());
        storage.exam_states.save_state(&key(), &state).await.unwrap();

        let ctl = controller(Clock::fixed(fixed_now()), &storage);
        let attempt = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        assert_eq!(attempt.answers().len(), 1);
        assert_eq!(attempt.answer(0), Some(1));
    }

    #[tokio::test]
    async fn reset_clears_answers_and_restarts_clock() {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let ctl = controller(clock.clone(), &storage);
        let mut attempt = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        ctl.select_answer(&mut attempt, 0, 2).await.unwrap();

        let mut later = clock.clone();
        later.advance(Duration::minutes(10));
        ctl.reset(&mut attempt).await.unwrap();

        assert!(attempt.answers().is_empty());
        let status = attempt.timer_status(clock.now()).unwrap();
        assert_eq!(status.remaining_secs, status.duration_secs);
        let saved = storage.exam_states.load_state(&key()).await.unwrap().unwrap();
        assert!(saved.answers().is_empty());
        assert_eq!(saved.start_time(), fixed_now() + Duration::minutes(10));
    }

    #[tokio::test]
    async fn discard_removes_saved_state() {
        let storage = Storage::in_memory();
        let ctl = controller(Clock::fixed(fixed_now()), &storage);
        let attempt = ctl.begin(key(), Some(ExamMode::Full), document()).await.unwrap();
        assert!(storage.exam_states.load_state(&key()).await.unwrap().is_some());
        ctl.discard(&attempt).await.unwrap();
        assert!(storage.exam_states.load_state(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn final_exams_get_the_extended_duration() {
        let storage = Storage::in_memory();
        let ctl = controller(Clock::fixed(fixed_now()), &storage);
        let final_key = ExamKey::new("physics", "final", "2024").unwrap();
        let attempt = ctl.begin(final_key, Some(ExamMode::Full), document()).await.unwrap();
        let status = attempt.timer_status(fixed_now()).unwrap();
        assert_eq!(status.duration_secs, 7200);
    }
}
