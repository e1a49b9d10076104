use exam_core::model::Question;
use exam_core::timer::WARNING_THRESHOLD_SECS;
use services::{ExamAttempt, TimerStatus};

use crate::vm::html::sanitize_html;
use crate::vm::time_fmt::format_clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    None,
    Correct,
    Wrong,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub label_html: String,
    pub selected: bool,
    pub mark: OptionMark,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub index: usize,
    pub number: usize,
    pub text_html: String,
    pub passage_html: Option<String>,
    pub images: Vec<String>,
    pub options: Vec<OptionVm>,
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerVm {
    pub remaining: String,
    pub progress_percent: u8,
    pub paused: bool,
    pub low: bool,
}

impl From<TimerStatus> for TimerVm {
    fn from(status: TimerStatus) -> Self {
        Self {
            remaining: format_clock(status.remaining_secs),
            progress_percent: status.progress_percent,
            paused: status.paused,
            low: status.remaining_secs <= WARNING_THRESHOLD_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamVm {
    pub title: String,
    pub one_at_a_time: bool,
    pub passage_html: Option<String>,
    /// Every question in full mode; only the current one otherwise.
    pub questions: Vec<QuestionVm>,
    pub position: String,
    pub can_prev: bool,
    pub is_last: bool,
    pub timer: Option<TimerVm>,
    pub paused: bool,
}

impl ExamVm {
    #[must_use]
    pub fn from_attempt(attempt: &ExamAttempt, timer: Option<TimerStatus>) -> Self {
        let document = attempt.document();
        let total = document.question_count();
        let one_at_a_time = attempt.is_one_at_a_time();

        let questions = if one_at_a_time {
            let cursor = attempt.cursor();
            document
                .question(cursor)
                .map(|q| vec![map_question(attempt, cursor, q)])
                .unwrap_or_default()
        } else {
            document
                .questions
                .iter()
                .enumerate()
                .map(|(index, q)| map_question(attempt, index, q))
                .collect()
        };

        Self {
            title: attempt.key().title(),
            one_at_a_time,
            passage_html: document.passage.as_deref().map(sanitize_html),
            questions,
            position: format!("Question {} of {}", attempt.cursor() + 1, total),
            can_prev: attempt.cursor() > 0,
            is_last: attempt.cursor() + 1 >= total,
            timer: timer.map(TimerVm::from),
            paused: attempt.is_paused(),
        }
    }
}

fn map_question(attempt: &ExamAttempt, index: usize, question: &Question) -> QuestionVm {
    let selected = attempt.answer(index);
    let feedback = attempt.feedback(index);
    let options = question
        .options
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mark = match feedback {
                Some(f) if i == f.correct => OptionMark::Correct,
                Some(f) if i == f.selected => OptionMark::Wrong,
                _ => OptionMark::None,
            };
            OptionVm {
                index: i,
                label_html: sanitize_html(label),
                selected: selected == Some(i),
                mark,
            }
        })
        .collect();

    QuestionVm {
        index,
        number: index + 1,
        text_html: sanitize_html(&question.q),
        passage_html: question.passage.as_deref().map(sanitize_html),
        images: question.image_sources().into_iter().map(String::from).collect(),
        options,
        locked: attempt.is_locked(index),
    }
}
