use std::sync::Arc;

use exam_core::model::ExamMode;
use exam_core::navigation::Step;
use services::{AppError, AppServices, ExamApp};
use tokio::sync::Mutex;

use crate::views::ViewError;
use crate::vm::ShellVm;

/// Supplied by the composition root (`crates/app`).
pub trait UiApp: Send + Sync {
    fn services(&self) -> AppServices;

    /// Deep link the window opened with, e.g. `?step=history`.
    fn initial_query(&self) -> String;
}

/// Every user intent the shell can raise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    Start,
    Subject(String),
    ExamType(String),
    Year(String),
    Mode(ExamMode),
    Answer { question: usize, option: usize },
    Next,
    Prev,
    TogglePause,
    Reset,
    Submit,
    TryAnotherYear,
    History,
    Contact,
    Home,
    Back,
    Forward,
    ToggleTheme,
    DismissNotice,
}

/// What the shell renders after an action settles.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub shell: ShellVm,
    pub error: Option<ViewError>,
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<Mutex<ExamApp>>,
    initial_query: String,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app: Arc::new(Mutex::new(ExamApp::new(app.services()))),
            initial_query: app.initial_query(),
        }
    }

    #[must_use]
    pub fn initial_query(&self) -> &str {
        &self.initial_query
    }

    pub async fn resume(&self) -> Frame {
        let mut app = self.app.lock().await;
        let result = app.resume(&self.initial_query).await.map(|_| ());
        frame(&app, result)
    }

    pub async fn dispatch(&self, action: UiAction) -> Frame {
        let mut app = self.app.lock().await;
        tracing::debug!(?action, step = %app.step(), "ui action");
        let result = apply(&mut app, action).await;
        frame(&app, result)
    }

    /// Heartbeat; `None` when no exam panel is showing.
    pub async fn tick(&self) -> Option<Frame> {
        let mut app = self.app.lock().await;
        if app.step() != Step::Exam || app.attempt().is_none() {
            return None;
        }
        let result = app.tick().await.map(|_| ());
        Some(frame(&app, result))
    }
}

async fn apply(app: &mut ExamApp, action: UiAction) -> Result<(), AppError> {
    match action {
        UiAction::Start => app.start().map(|_| ()),
        UiAction::Subject(subject) => app.select_subject(&subject).await.map(|_| ()),
        UiAction::ExamType(exam_type) => app.select_type(&exam_type).await.map(|_| ()),
        UiAction::Year(year) => app.select_year(&year).await.map(|_| ()),
        UiAction::Mode(mode) => app.select_mode(mode).await.map(|_| ()),
        UiAction::Answer { question, option } => app.answer(question, option).await.map(|_| ()),
        UiAction::Next => app.next_question().await.map(|_| ()),
        UiAction::Prev => app.prev_question().map(|_| ()),
        UiAction::TogglePause => app.toggle_pause().await.map(|_| ()),
        UiAction::Reset => app.reset_attempt().await,
        UiAction::Submit => app.submit().await.map(|_| ()),
        UiAction::TryAnotherYear => app.try_another_year().await.map(|_| ()),
        UiAction::History => app.show_history().await.map(|_| ()),
        UiAction::Contact => app.show_contact().map(|_| ()),
        UiAction::Home => app.go_home().await.map(|_| ()),
        UiAction::Back => app.back().await.map(|_| ()),
        UiAction::Forward => app.forward().await.map(|_| ()),
        UiAction::ToggleTheme => app.toggle_theme().await.map(|_| ()),
        UiAction::DismissNotice => {
            let _ = app.take_notice();
            Ok(())
        }
    }
}

fn frame(app: &ExamApp, result: Result<(), AppError>) -> Frame {
    let error = result.err().map(|err| {
        tracing::warn!(error = %err, "action failed");
        ViewError::from(&err)
    });
    Frame {
        shell: ShellVm::from_app(app),
        error,
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
