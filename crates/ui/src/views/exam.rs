use dioxus::prelude::*;

use crate::context::UiAction;
use crate::vm::{ExamVm, OptionMark, OptionVm, QuestionVm, TimerVm};

#[component]
pub fn ExamPanel(exam: ExamVm, on_action: Callback<UiAction>) -> Element {
    let paused = exam.paused;
    rsx! {
        section { class: "page exam",
            div { class: "exam-header",
                h2 { "{exam.title}" }
                if let Some(timer) = exam.timer.clone() {
                    TimerBar { timer, on_action }
                }
            }

            if let Some(passage) = exam.passage_html.clone() {
                div { class: "passage", dangerous_inner_html: "{passage}" }
            }

            if exam.one_at_a_time {
                p { class: "exam-position", "{exam.position}" }
                for question in exam.questions.clone() {
                    QuestionCard { key: "{question.index}", question, paused, on_action }
                }
                div { class: "exam-actions",
                    button {
                        class: "btn-secondary",
                        r#type: "button",
                        disabled: !exam.can_prev,
                        onclick: move |_| on_action.call(UiAction::Prev),
                        "Previous"
                    }
                    button {
                        class: "btn-primary",
                        r#type: "button",
                        onclick: move |_| on_action.call(UiAction::Next),
                        if exam.is_last { "Finish" } else { "Next" }
                    }
                }
            } else {
                div { class: if paused { "question-list question-list--paused" } else { "question-list" },
                    for question in exam.questions.clone() {
                        QuestionCard { key: "{question.index}", question, paused, on_action }
                    }
                }
                div { class: "exam-actions",
                    button {
                        class: "btn-primary",
                        r#type: "button",
                        disabled: paused,
                        onclick: move |_| on_action.call(UiAction::Submit),
                        "Submit exam"
                    }
                }
            }
        }
    }
}

#[component]
fn TimerBar(timer: TimerVm, on_action: Callback<UiAction>) -> Element {
    let width = format!("width: {}%;", timer.progress_percent);
    rsx! {
        div { class: if timer.low { "timer timer--low" } else { "timer" },
            span { class: "timer-remaining", "{timer.remaining}" }
            div { class: "timer-track",
                div { class: "timer-progress", style: "{width}" }
            }
            button {
                class: "btn-secondary",
                r#type: "button",
                onclick: move |_| on_action.call(UiAction::TogglePause),
                if timer.paused { "Resume" } else { "Pause" }
            }
            button {
                class: "btn-secondary",
                r#type: "button",
                onclick: move |_| on_action.call(UiAction::Reset),
                "Reset"
            }
            if timer.paused {
                span { class: "timer-paused", "Paused" }
            }
        }
    }
}

#[component]
fn QuestionCard(question: QuestionVm, paused: bool, on_action: Callback<UiAction>) -> Element {
    let index = question.index;
    let inert = paused || question.locked;
    rsx! {
        article { class: "question",
            if let Some(passage) = question.passage_html.clone() {
                div { class: "passage", dangerous_inner_html: "{passage}" }
            }
            div { class: "question-text",
                span { class: "question-number", "{question.number}. " }
                span { dangerous_inner_html: "{question.text_html}" }
            }
            for src in question.images.clone() {
                img { key: "{src}", class: "question-image", src: "{src}", alt: "Question {question.number} figure" }
            }
            ul { class: "options",
                for option in question.options.clone() {
                    OptionRow { key: "{option.index}", question: index, option, inert, on_action }
                }
            }
        }
    }
}

#[component]
fn OptionRow(question: usize, option: OptionVm, inert: bool, on_action: Callback<UiAction>) -> Element {
    let mut class = String::from("option");
    match option.mark {
        OptionMark::Correct => class.push_str(" option--correct"),
        OptionMark::Wrong => class.push_str(" option--wrong"),
        OptionMark::None => {}
    }
    if inert {
        class.push_str(" option--inert");
    }
    let name = format!("q{question}");
    let choice = option.index;

    rsx! {
        li { class: "{class}",
            label {
                input {
                    r#type: "radio",
                    name: "{name}",
                    checked: option.selected,
                    disabled: inert,
                    onchange: move |_| on_action.call(UiAction::Answer { question, option: choice }),
                }
                span { dangerous_inner_html: "{option.label_html}" }
            }
        }
    }
}
