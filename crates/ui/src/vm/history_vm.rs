use exam_core::model::ExamResult;

use crate::vm::time_fmt::{format_clock, format_datetime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryCardVm {
    pub title: String,
    pub when: String,
    pub mode: Option<&'static str>,
    pub best_score: String,
    pub best_percentage: String,
    pub attempts: u32,
    /// Last score, only when it differs from the best.
    pub last_score: Option<String>,
    pub time_taken: Option<String>,
    /// Best time, only when it differs from the last attempt's time.
    pub best_time: Option<String>,
}

impl From<&ExamResult> for HistoryCardVm {
    fn from(result: &ExamResult) -> Self {
        let best_score = result.effective_best_score();
        Self {
            title: result.title(),
            when: format_datetime(result.last_attempt),
            mode: result.mode.map(|m| m.label()),
            best_score: format!("{best_score} / {}", result.total),
            best_percentage: format!("{}%", result.effective_best_percentage()),
            attempts: result.attempts,
            last_score: (result.score != best_score)
                .then(|| format!("{} / {}", result.score, result.total)),
            time_taken: result.time_taken.map(format_clock),
            best_time: result
                .time_differs_from_best()
                .then(|| result.best_time.map(format_clock))
                .flatten(),
        }
    }
}

#[must_use]
pub fn map_history_cards(results: &[ExamResult]) -> Vec<HistoryCardVm> {
    results.iter().map(HistoryCardVm::from).collect()
}
