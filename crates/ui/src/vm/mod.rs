mod exam_vm;
mod history_vm;
mod html;
mod results_vm;
mod shell_vm;
mod time_fmt;

pub use exam_vm::{ExamVm, OptionMark, OptionVm, QuestionVm, TimerVm};
pub use history_vm::{HistoryCardVm, map_history_cards};
pub use html::sanitize_html;
pub use results_vm::{ResultsVm, ReviewVm};
pub use shell_vm::{
    ChoiceVm, EMPTY_HISTORY_MESSAGE, ModeChoiceVm, NoticeVm, SelectionVm, ShellVm, YearButtonVm,
    title_case,
};
pub use time_fmt::{format_clock, format_datetime};
