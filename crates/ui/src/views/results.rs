use dioxus::prelude::*;

use crate::context::UiAction;
use crate::vm::{ResultsVm, ReviewVm};

#[component]
pub fn ResultsPanel(results: ResultsVm, on_action: Callback<UiAction>) -> Element {
    rsx! {
        section { class: "page results",
            h2 { "{results.title}" }
            if results.timed_out {
                p { class: "results-timeout", "Time ran out before you submitted." }
            }
            div { class: "score-summary",
                span { class: "score-raw", "{results.raw_score}" }
                span { class: "score-percentage", "{results.percentage}%" }
                if let Some(taken) = results.time_taken.clone() {
                    span { class: "score-time", "Time: {taken}" }
                }
            }
            p { class: "score-comment", "{results.comment}" }

            div { class: "exam-actions",
                button {
                    class: "btn-primary",
                    r#type: "button",
                    onclick: move |_| on_action.call(UiAction::TryAnotherYear),
                    "Try another year"
                }
                button {
                    class: "btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_action.call(UiAction::History),
                    "View history"
                }
            }

            h3 { "Review" }
            ol { class: "review-list",
                for review in results.reviews.clone() {
                    ReviewItem { key: "{review.number}", review }
                }
            }
        }
    }
}

#[component]
fn ReviewItem(review: ReviewVm) -> Element {
    rsx! {
        li { class: if review.is_correct { "review review--correct" } else { "review review--wrong" },
            div { class: "review-question",
                span { class: "review-mark", if review.is_correct { "\u{2713} " } else { "\u{2717} " } }
                span { dangerous_inner_html: "{review.question_html}" }
            }
            for src in review.images.clone() {
                img { key: "{src}", class: "question-image", src: "{src}" }
            }
            p { class: "review-answer",
                "Your answer: "
                span { dangerous_inner_html: "{review.your_answer_html}" }
            }
            if let Some(correct) = review.correct_answer_html.clone() {
                p { class: "review-correct",
                    "Correct answer: "
                    span { dangerous_inner_html: "{correct}" }
                }
            }
        }
    }
}
