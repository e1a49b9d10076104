use exam_core::model::{ExamMode, Theme};
use exam_core::navigation::Step;
use services::{ExamApp, Notice, YearOption};

use crate::vm::exam_vm::ExamVm;
use crate::vm::history_vm::{HistoryCardVm, map_history_cards};
use crate::vm::results_vm::ResultsVm;

pub const EMPTY_HISTORY_MESSAGE: &str =
    "No completed exams yet. Start practicing to see your results here!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearButtonVm {
    pub year: String,
    pub available: bool,
    pub availability: &'static str,
    /// Completion badge with the best percentage so far.
    pub badge: Option<String>,
}

impl From<&YearOption> for YearButtonVm {
    fn from(option: &YearOption) -> Self {
        Self {
            year: option.year.clone(),
            available: option.available,
            availability: if option.available {
                "(available)"
            } else {
                "(not available)"
            },
            badge: option.best_percentage.map(|p| format!("{p}%")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChoiceVm {
    pub mode: ExamMode,
    pub label: &'static str,
    pub hint: &'static str,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionVm {
    pub subjects: Vec<ChoiceVm>,
    pub exam_types: Vec<ChoiceVm>,
    pub years: Vec<YearButtonVm>,
    pub modes: Vec<ModeChoiceVm>,
    /// Breadcrumb of what has been picked so far, e.g. `Physics / Final / 2024`.
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeVm {
    pub text: String,
    pub warning: bool,
}

impl From<&Notice> for NoticeVm {
    fn from(notice: &Notice) -> Self {
        Self {
            text: notice.message().to_string(),
            warning: matches!(notice, Notice::Warning(_)),
        }
    }
}

/// Everything the shell needs to paint one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellVm {
    pub step: Step,
    pub query: String,
    pub theme: Theme,
    pub has_mode_step: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub notice: Option<NoticeVm>,
    pub selection: SelectionVm,
    pub exam: Option<ExamVm>,
    pub results: Option<ResultsVm>,
    pub history: Vec<HistoryCardVm>,
}

impl ShellVm {
    #[must_use]
    pub fn from_app(app: &ExamApp) -> Self {
        let session = app.session();
        let choices = app.choices();

        let subjects = choices
            .subjects
            .iter()
            .map(|s| choice(s, session.subject()))
            .collect();
        let exam_types = choices
            .exam_types
            .iter()
            .map(|t| choice(t, session.exam_type()))
            .collect();
        let modes = ExamMode::ALL
            .into_iter()
            .map(|mode| ModeChoiceVm {
                mode,
                label: mode.label(),
                hint: mode_hint(mode),
                selected: session.mode() == Some(mode),
            })
            .collect();

        let summary = [session.subject(), session.exam_type(), session.year()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" / ");

        let exam = app
            .attempt()
            .map(|attempt| ExamVm::from_attempt(attempt, app.timer_status()));

        Self {
            step: app.step(),
            query: app.query(),
            theme: app.theme(),
            has_mode_step: app.flow().has_mode_step(),
            can_go_back: app.can_go_back(),
            can_go_forward: app.can_go_forward(),
            notice: app.notice().map(NoticeVm::from),
            selection: SelectionVm {
                subjects,
                exam_types,
                years: app.years().iter().map(YearButtonVm::from).collect(),
                modes,
                summary,
            },
            exam,
            results: app.outcome().map(ResultsVm::from),
            history: map_history_cards(app.history()),
        }
    }

    #[must_use]
    pub fn theme_class(&self) -> &'static str {
        match self.theme {
            Theme::Dark => "app-root theme-dark",
            Theme::Light => "app-root theme-light",
        }
    }
}

fn choice(value: &str, current: &str) -> ChoiceVm {
    ChoiceVm {
        value: value.to_string(),
        label: title_case(value),
        selected: value == current,
    }
}

fn mode_hint(mode: ExamMode) -> &'static str {
    match mode {
        ExamMode::Full => "All questions on one page against the clock.",
        ExamMode::QuestionByQuestion => "One question at a time with instant feedback.",
    }
}

#[must_use]
pub fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
