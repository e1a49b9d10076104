//! Application-state object: the only owner of session, navigation and the running attempt.

use std::sync::Arc;

use exam_core::model::{ExamDocument, ExamKey, ExamMode, ExamResult, Session, Theme};
use exam_core::navigation::{Flow, NavigationError, Navigator, Step};
use exam_core::timer::{Tick, TickEvent};

use crate::app_services::AppServices;
use crate::attempt::{Advance, AnswerFeedback, ExamAttempt, TimerStatus};
use crate::catalog::{CatalogConfig, YearOption};
use crate::error::AppError;
use crate::results::SubmissionOutcome;

/// Transient message for the user, shown once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Info(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Notice::Warning(message) | Notice::Info(message) => message,
        }
    }
}

pub struct ExamApp {
    services: AppServices,
    choices: CatalogConfig,
    session: Session,
    navigator: Navigator,
    exam: Option<Arc<ExamDocument>>,
    attempt: Option<ExamAttempt>,
    years: Vec<YearOption>,
    outcome: Option<SubmissionOutcome>,
    history: Vec<ExamResult>,
    theme: Theme,
    notice: Option<Notice>,
}

impl ExamApp {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        let choices = services.catalog().config().clone();
        let navigator = Navigator::new(services.flow());
        Self {
            services,
            choices,
            session: Session::new(),
            navigator,
            exam: None,
            attempt: None,
            years: Vec::new(),
            outcome: None,
            history: Vec::new(),
            theme: Theme::default(),
            notice: None,
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.navigator.current()
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.navigator.flow()
    }

    /// Deep link of the current step.
    #[must_use]
    pub fn query(&self) -> String {
        self.navigator.query()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.navigator.can_go_back()
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.navigator.can_go_forward()
    }

    #[must_use]
    pub fn choices(&self) -> &CatalogConfig {
        &self.choices
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn exam(&self) -> Option<&Arc<ExamDocument>> {
        self.exam.as_ref()
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&ExamAttempt> {
        self.attempt.as_ref()
    }

    #[must_use]
    pub fn years(&self) -> &[YearOption] {
        &self.years
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &[ExamResult] {
        &self.history
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    #[must_use]
    pub fn timer_status(&self) -> Option<TimerStatus> {
        let now = self.services.clock().now();
        self.attempt.as_ref().and_then(|a| a.timer_status(now))
    }

    /// Rebuild state after a launch or reload from the persisted session and a deep link.
    ///
    /// # Errors
    ///
    /// Returns `AppError` when storage fails or a deep-linked exam cannot be
    /// loaded; the app is left on home in that case.
    pub async fn resume(&mut self, query: &str) -> Result<Step, AppError> {
        self.theme = self.services.preferences().theme().await?;
        self.session = self
            .services
            .sessions()
            .load_session()
            .await?
            .unwrap_or_default();

        let requested = match Step::from_query(query) {
            Ok(step) if self.flow().has_step(step) => step,
            Ok(step) => {
                tracing::warn!(%step, "step not part of this flow");
                Step::Home
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "ignoring deep link");
                Step::Home
            }
        };

        let step = match requested {
            Step::Exam => match self.session.key() {
                Some(key) => self.resume_exam(key).await?,
                None => Step::Home,
            },
            Step::History => {
                self.refresh_history().await?;
                Step::History
            }
            Step::Year if self.session.has_subject_and_type() => {
                self.refresh_years().await?;
                Step::Year
            }
            other => other,
        };

        self.navigator.restore(step)?;
        tracing::info!(%step, "resumed");
        Ok(step)
    }

    async fn resume_exam(&mut self, key: ExamKey) -> Result<Step, AppError> {
        let mode = self.session.mode();
        if self.flow().has_mode_step() && mode.is_none() {
            return Ok(Step::Mode);
        }
        match self.load_and_begin(key, mode).await {
            Ok(()) => Ok(Step::Exam),
            Err(err) => {
                self.navigator.restore(Step::Home)?;
                Err(err)
            }
        }
    }

    /// Leave home for the subject panel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Navigation` unless the app is on home.
    pub fn start(&mut self) -> Result<Step, AppError> {
        self.enter(Step::Subject)
    }

    /// # Errors
    ///
    /// Returns `AppError` for invalid transitions, bad input or storage failures.
    pub async fn select_subject(&mut self, subject: &str) -> Result<Step, AppError> {
        self.ensure(Step::Type)?;
        self.session.set_subject(subject)?;
        self.save_session().await?;
        self.enter(Step::Type)
    }

    /// # Errors
    ///
    /// Returns `AppError` for invalid transitions, bad input or storage failures.
    pub async fn select_type(&mut self, exam_type: &str) -> Result<Step, AppError> {
        self.ensure(Step::Year)?;
        self.session.set_exam_type(exam_type)?;
        self.save_session().await?;
        self.refresh_years().await?;
        self.enter(Step::Year)
    }

    /// Pick a year after re-checking that its document exists.
    ///
    /// The timed flow moves on to the mode panel; the classic flow loads the
    /// exam straight away.
    ///
    /// # Errors
    ///
    /// Returns `AppError::YearUnavailable` if the availability check fails and
    /// `AppError::Load` if the classic flow cannot load the exam.
    pub async fn select_year(&mut self, year: &str) -> Result<Step, AppError> {
        let next = if self.flow().has_mode_step() {
            Step::Mode
        } else {
            Step::Exam
        };
        self.ensure(next)?;

        let key = self.session.key_for_year(year)?;
        if !self.services.catalog().check_availability(&key).await {
            tracing::warn!(exam = %key, "selected year is not available");
            return Err(AppError::YearUnavailable {
                year: key.year().to_string(),
            });
        }

        self.session.set_year(key.year())?;
        self.save_session().await?;
        if next == Step::Exam {
            self.load_and_begin(key, None).await?;
        }
        self.enter(next)
    }

    /// # Errors
    ///
    /// Returns `AppError::IncompleteSession` without a year, or a load error.
    pub async fn select_mode(&mut self, mode: ExamMode) -> Result<Step, AppError> {
        self.ensure(Step::Exam)?;
        let key = self.session.key().ok_or(AppError::IncompleteSession)?;
        self.session.set_mode(mode);
        self.save_session().await?;
        self.load_and_begin(key, Some(mode)).await?;
        self.enter(Step::Exam)
    }

    async fn load_and_begin(&mut self, key: ExamKey, mode: Option<ExamMode>) -> Result<(), AppError> {
        let document = Arc::new(self.services.catalog().load_exam(&key).await?);
        let attempt = self
            .services
            .attempts()
            .begin(key, mode, Arc::clone(&document))
            .await?;
        self.exam = Some(document);
        self.attempt = Some(attempt);
        self.outcome = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` or the controller's rejection.
    pub async fn answer(
        &mut self,
        question: usize,
        option: usize,
    ) -> Result<Option<AnswerFeedback>, AppError> {
        let attempts = self.services.attempts();
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        Ok(attempts.select_answer(attempt, question, option).await?)
    }

    /// Move to the next question; past the last one the attempt is submitted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` or a submission failure.
    pub async fn next_question(&mut self) -> Result<Step, AppError> {
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        match attempt.next() {
            Advance::Moved(_) => Ok(self.step()),
            Advance::PastEnd => self.submit().await,
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` without a running attempt.
    pub fn prev_question(&mut self) -> Result<Option<usize>, AppError> {
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        Ok(attempt.prev())
    }

    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` or `AttemptError::NotTimed` for untimed attempts.
    pub async fn toggle_pause(&mut self) -> Result<bool, AppError> {
        let attempts = self.services.attempts();
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        Ok(attempts.toggle_pause(attempt).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` or a storage failure.
    pub async fn reset_attempt(&mut self) -> Result<(), AppError> {
        let attempts = self.services.attempts();
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        Ok(attempts.reset(attempt).await?)
    }

    /// One-second heartbeat. Only the exam panel runs the clock.
    ///
    /// Expiry submits the attempt exactly like a manual submit.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if saving state or the forced submission fails.
    pub async fn tick(&mut self) -> Result<Option<Tick>, AppError> {
        if self.step() != Step::Exam {
            return Ok(None);
        }
        let attempts = self.services.attempts();
        let Some(attempt) = self.attempt.as_mut() else {
            return Ok(None);
        };
        let tick = attempts.tick(attempt).await?;

        match tick.map(|t| t.event) {
            Some(TickEvent::Warning) => {
                self.notice = Some(Notice::Warning("Only 5 minutes remaining!".into()));
            }
            Some(TickEvent::Expired) => {
                self.finish(true).await?;
                self.notice = Some(Notice::Info(
                    "Time is up! Your answers have been submitted.".into(),
                ));
            }
            _ => {}
        }
        Ok(tick)
    }

    /// Score the running attempt and show the results panel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoAttempt` or a result-store failure.
    pub async fn submit(&mut self) -> Result<Step, AppError> {
        self.finish(false).await
    }

    async fn finish(&mut self, timed_out: bool) -> Result<Step, AppError> {
        self.ensure(Step::Results)?;
        let results = self.services.results();
        let attempt = self.attempt.as_mut().ok_or(AppError::NoAttempt)?;
        let outcome = results.submit(attempt, timed_out).await?;
        self.attempt = None;
        self.outcome = Some(outcome);
        self.enter(Step::Results)
    }

    /// From the results panel back to the year list.
    ///
    /// # Errors
    ///
    /// Returns `AppError` for invalid transitions or listing failures.
    pub async fn try_another_year(&mut self) -> Result<Step, AppError> {
        self.ensure(Step::Year)?;
        self.refresh_years().await?;
        self.enter(Step::Year)
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the index cannot be read.
    pub async fn show_history(&mut self) -> Result<Step, AppError> {
        self.ensure(Step::History)?;
        self.refresh_history().await?;
        self.enter(Step::History)
    }

    /// # Errors
    ///
    /// Returns `AppError::Navigation` in the classic flow.
    pub fn show_contact(&mut self) -> Result<Step, AppError> {
        self.enter(Step::Contact)
    }

    /// Return home, abandoning any running attempt.
    ///
    /// The timed flow also forgets the current selection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if saved state cannot be removed.
    pub async fn go_home(&mut self) -> Result<Step, AppError> {
        self.ensure(Step::Home)?;
        self.leave_for_home().await?;
        self.enter(Step::Home)
    }

    /// Replay the previous recorded step.
    ///
    /// Landing on home abandons the attempt the same way `go_home` does.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if saved state cannot be removed.
    pub async fn back(&mut self) -> Result<Option<Step>, AppError> {
        let step = self.navigator.back();
        if let Some(step) = step {
            tracing::debug!(%step, "back");
            self.replayed(step).await?;
        }
        Ok(step)
    }

    /// Replay the next recorded step.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if saved state cannot be removed.
    pub async fn forward(&mut self) -> Result<Option<Step>, AppError> {
        let step = self.navigator.forward();
        if let Some(step) = step {
            tracing::debug!(%step, "forward");
            self.replayed(step).await?;
        }
        Ok(step)
    }

    async fn replayed(&mut self, step: Step) -> Result<(), AppError> {
        if step == Step::Home {
            self.leave_for_home().await?;
        }
        Ok(())
    }

    async fn leave_for_home(&mut self) -> Result<(), AppError> {
        if let Some(attempt) = self.attempt.take() {
            self.services.attempts().discard(&attempt).await?;
        }
        self.exam = None;
        self.years.clear();
        if self.flow().has_mode_step() {
            self.session.clear();
            self.services.sessions().clear_session().await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the preference cannot be saved.
    pub async fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        self.theme = self.services.preferences().toggle_theme(self.theme).await?;
        Ok(self.theme)
    }

    async fn refresh_years(&mut self) -> Result<(), AppError> {
        self.years = self
            .services
            .catalog()
            .list_years(self.session.subject(), self.session.exam_type())
            .await?;
        Ok(())
    }

    async fn refresh_history(&mut self) -> Result<(), AppError> {
        self.history = self.services.history().list().await?;
        Ok(())
    }

    async fn save_session(&self) -> Result<(), AppError> {
        self.services.sessions().save_session(&self.session).await?;
        Ok(())
    }

    fn ensure(&self, to: Step) -> Result<(), AppError> {
        let from = self.step();
        if from == to || self.flow().allows(from, to) {
            Ok(())
        } else {
            Err(NavigationError::InvalidTransition { from, to }.into())
        }
    }

    fn enter(&mut self, to: Step) -> Result<Step, AppError> {
        let step = self.navigator.go(to)?;
        tracing::info!(%step, "navigated");
        Ok(step)
    }
}
