//! Explicit step state machine with back/forward history.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },

    #[error("unknown step: {0}")]
    UnknownStep(String),
}

/// A named panel of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Home,
    Subject,
    Type,
    Year,
    Mode,
    Exam,
    Results,
    History,
    Contact,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Home,
        Step::Subject,
        Step::Type,
        Step::Year,
        Step::Mode,
        Step::Exam,
        Step::Results,
        Step::History,
        Step::Contact,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Home => "home",
            Step::Subject => "subject",
            Step::Type => "type",
            Step::Year => "year",
            Step::Mode => "mode",
            Step::Exam => "exam",
            Step::Results => "results",
            Step::History => "history",
            Step::Contact => "contact",
        }
    }

    /// Parse a deep link: `?step=year`, `step=year` or a bare `year`.
    ///
    /// An empty query means home.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::UnknownStep` when the name is not a step.
    pub fn from_query(query: &str) -> Result<Self, NavigationError> {
        let trimmed = query.trim().trim_start_matches('?');
        if trimmed.is_empty() {
            return Ok(Step::Home);
        }
        let value = trimmed
            .split('&')
            .find_map(|pair| pair.strip_prefix("step="))
            .unwrap_or(trimmed);
        value.parse()
    }

    /// Deep link for this step; home is the bare path.
    #[must_use]
    pub fn to_query(self) -> String {
        match self {
            Step::Home => String::new(),
            other => format!("?step={}", other.as_str()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == lowered)
            .ok_or(NavigationError::UnknownStep(lowered))
    }
}

/// Which variant of the selection flow is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    /// Subject, type, year, then an untimed all-at-once exam.
    Classic,
    /// Adds the mode step (timed full exam or question-by-question) and the contact panel.
    #[default]
    Timed,
}

impl Flow {
    #[must_use]
    pub fn has_mode_step(self) -> bool {
        matches!(self, Flow::Timed)
    }

    #[must_use]
    pub fn has_step(self, step: Step) -> bool {
        match step {
            Step::Mode | Step::Contact => self.has_mode_step(),
            _ => true,
        }
    }

    /// The transition table.
    #[must_use]
    pub fn allows(self, from: Step, to: Step) -> bool {
        if !self.has_step(from) || !self.has_step(to) {
            return false;
        }
        match (from, to) {
            (_, Step::Home | Step::History | Step::Contact) => true,
            (Step::Home, Step::Subject)
            | (Step::Subject, Step::Type)
            | (Step::Type, Step::Year)
            | (Step::Exam, Step::Results)
            | (Step::Results, Step::Year) => true,
            (Step::Year, Step::Mode) | (Step::Mode, Step::Exam) => self.has_mode_step(),
            (Step::Year, Step::Exam) => !self.has_mode_step(),
            _ => false,
        }
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(Flow::Classic),
            "timed" => Ok(Flow::Timed),
            other => Err(format!("unknown flow: {other}")),
        }
    }
}

/// Current step plus a browser-style history of visited steps.
///
/// `go` validates against the flow's transition table and drops any forward
/// entries; `back`/`forward` replay recorded steps without validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    flow: Flow,
    entries: Vec<Step>,
    cursor: usize,
}

impl Navigator {
    #[must_use]
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            entries: vec![Step::Home],
            cursor: 0,
        }
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    #[must_use]
    pub fn current(&self) -> Step {
        self.entries[self.cursor]
    }

    /// Move to `to`, recording it in history.
    ///
    /// Re-entering the current step is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` if the table forbids it.
    pub fn go(&mut self, to: Step) -> Result<Step, NavigationError> {
        let from = self.current();
        if from == to {
            return Ok(to);
        }
        if !self.flow.allows(from, to) {
            return Err(NavigationError::InvalidTransition { from, to });
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(to);
        self.cursor += 1;
        Ok(to)
    }

    /// Replace history with a single entry, as on a reload of a deep link.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` for steps the flow lacks.
    pub fn restore(&mut self, step: Step) -> Result<Step, NavigationError> {
        if !self.flow.has_step(step) {
            return Err(NavigationError::InvalidTransition {
                from: self.current(),
                to: step,
            });
        }
        self.entries = vec![step];
        self.cursor = 0;
        Ok(step)
    }

    pub fn back(&mut self) -> Option<Step> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<Step> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn query(&self) -> String {
        self.current().to_query()
    }
}
