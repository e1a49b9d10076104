mod contact;
mod exam;
mod history;
mod results;
mod selection;
mod shell;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use contact::ContactPanel;
pub use exam::ExamPanel;
pub use history::HistoryPanel;
pub use results::ResultsPanel;
pub use selection::{HomePanel, ModePanel, SubjectPanel, TypePanel, YearPanel};
pub use shell::{ExamShellView, ShellFrame};
pub use state::ViewError;
