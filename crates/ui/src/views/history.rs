use dioxus::prelude::*;

use crate::context::UiAction;
use crate::vm::{EMPTY_HISTORY_MESSAGE, HistoryCardVm};

#[component]
pub fn HistoryPanel(cards: Vec<HistoryCardVm>, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page",
            h2 { "History" }
            if cards.is_empty() {
                p { class: "empty", "{EMPTY_HISTORY_MESSAGE}" }
                button {
                    class: "btn-primary",
                    r#type: "button",
                    onclick: move |_| on_action.call(UiAction::Home),
                    "Start practicing"
                }
            } else {
                div { class: "history-grid",
                    for card in cards {
                        HistoryCard { key: "{card.title}", card: card.clone() }
                    }
                }
            }
        }
    }
}

#[component]
fn HistoryCard(card: HistoryCardVm) -> Element {
    rsx! {
        div { class: "history-card",
            div { class: "history-header",
                h3 { "{card.title}" }
                span { class: "history-date", "{card.when}" }
            }
            if let Some(mode) = card.mode {
                span { class: "history-mode", "{mode}" }
            }
            div { class: "history-stats",
                Stat { label: "Best Score:", value: card.best_score.clone() }
                Stat { label: "Best Percentage:", value: card.best_percentage.clone() }
                Stat { label: "Attempts:", value: card.attempts.to_string() }
                if let Some(last) = card.last_score.clone() {
                    Stat { label: "Last Score:", value: last }
                }
                if let Some(taken) = card.time_taken.clone() {
                    Stat { label: "Time:", value: taken }
                }
                if let Some(best) = card.best_time.clone() {
                    Stat { label: "Best Time:", value: best }
                }
            }
        }
    }
}

#[component]
fn Stat(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "stat-item",
            span { class: "stat-label", "{label}" }
            span { class: "stat-value", "{value}" }
        }
    }
}
