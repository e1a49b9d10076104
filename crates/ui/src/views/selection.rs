use dioxus::prelude::*;

use crate::context::UiAction;
use crate::vm::{ChoiceVm, ModeChoiceVm, YearButtonVm};

#[component]
pub fn HomePanel(on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page home",
            h2 { "Practice past exams" }
            p { "Pick a subject, an exam type and a year, then work through the paper at your own pace or against the clock." }
            button {
                class: "btn-primary",
                r#type: "button",
                onclick: move |_| on_action.call(UiAction::Start),
                "Start practicing"
            }
        }
    }
}

#[component]
pub fn SubjectPanel(choices: Vec<ChoiceVm>, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page",
            h2 { "Choose a subject" }
            div { class: "choice-grid",
                for choice in choices {
                    ChoiceButton {
                        key: "{choice.value}",
                        choice: choice.clone(),
                        on_pick: move |value: String| on_action.call(UiAction::Subject(value)),
                    }
                }
            }
        }
    }
}

#[component]
pub fn TypePanel(summary: String, choices: Vec<ChoiceVm>, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page",
            p { class: "breadcrumb", "{summary}" }
            h2 { "Choose an exam type" }
            div { class: "choice-grid",
                for choice in choices {
                    ChoiceButton {
                        key: "{choice.value}",
                        choice: choice.clone(),
                        on_pick: move |value: String| on_action.call(UiAction::ExamType(value)),
                    }
                }
            }
        }
    }
}

#[component]
fn ChoiceButton(choice: ChoiceVm, on_pick: Callback<String>) -> Element {
    let value = choice.value.clone();
    rsx! {
        button {
            class: if choice.selected { "btn-choice btn-choice--selected" } else { "btn-choice" },
            r#type: "button",
            onclick: move |_| on_pick.call(value.clone()),
            "{choice.label}"
        }
    }
}

/// Unavailable years render disabled; completed ones carry their best percentage.
#[component]
pub fn YearPanel(summary: String, years: Vec<YearButtonVm>, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page",
            p { class: "breadcrumb", "{summary}" }
            h2 { "Choose a year" }
            if years.is_empty() {
                p { class: "empty", "Checking which exams are available..." }
            }
            div { class: "choice-grid",
                for year in years {
                    YearButton { key: "{year.year}", year: year.clone(), on_action }
                }
            }
        }
    }
}

#[component]
fn YearButton(year: YearButtonVm, on_action: Callback<UiAction>) -> Element {
    let mut class = String::from("btn-choice");
    if !year.available {
        class.push_str(" unavailable");
    }
    if year.badge.is_some() {
        class.push_str(" completed");
    }
    let value = year.year.clone();
    let status_class = if year.available {
        "availability-badge available"
    } else {
        "availability-badge unavailable"
    };

    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            disabled: !year.available,
            onclick: move |_| on_action.call(UiAction::Year(value.clone())),
            "{year.year} "
            span { class: "{status_class}", "{year.availability}" }
            if let Some(badge) = year.badge.clone() {
                span { class: "completion-badge", "{badge}" }
            }
        }
    }
}

#[component]
pub fn ModePanel(summary: String, modes: Vec<ModeChoiceVm>, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page",
            p { class: "breadcrumb", "{summary}" }
            h2 { "How do you want to practice?" }
            div { class: "mode-grid",
                for choice in modes {
                    button {
                        key: "{choice.label}",
                        class: if choice.selected { "mode-card mode-card--selected" } else { "mode-card" },
                        r#type: "button",
                        onclick: move |_| on_action.call(UiAction::Mode(choice.mode)),
                        strong { "{choice.label}" }
                        span { class: "mode-hint", "{choice.hint}" }
                    }
                }
            }
        }
    }
}
