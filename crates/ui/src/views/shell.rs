use dioxus::prelude::*;
use exam_core::model::Theme;
use exam_core::navigation::Step;

use crate::context::{AppContext, Frame, UiAction};
use crate::views::ViewError;
use crate::views::contact::ContactPanel;
use crate::views::exam::ExamPanel;
use crate::views::history::HistoryPanel;
use crate::views::results::ResultsPanel;
use crate::views::selection::{HomePanel, ModePanel, SubjectPanel, TypePanel, YearPanel};
use crate::vm::{NoticeVm, ShellVm};

/// Context-driven root: resumes once, ticks every second and routes actions.
#[component]
pub fn ExamShellView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut frame = use_signal(|| None::<Frame>);

    let resume_ctx = ctx.clone();
    use_future(move || {
        let ctx = resume_ctx.clone();
        async move {
            frame.set(Some(ctx.resume().await));
        }
    });

    let tick_ctx = ctx.clone();
    use_future(move || {
        let ctx = tick_ctx.clone();
        async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                if let Some(mut next) = ctx.tick().await {
                    if next.error.is_none() {
                        next.error = frame.peek().as_ref().and_then(|f| f.error.clone());
                    }
                    frame.set(Some(next));
                }
            }
        }
    });

    let on_action = use_callback(move |action: UiAction| {
        let ctx = ctx.clone();
        spawn(async move {
            frame.set(Some(ctx.dispatch(action).await));
        });
    });

    let current = frame.read().clone();
    match current {
        None => rsx! {
            div { class: "app-root theme-dark",
                p { class: "loading", "Loading..." }
            }
        },
        Some(Frame { shell, error }) => rsx! {
            ShellFrame { shell, error, on_action }
        },
    }
}

#[component]
pub fn ShellFrame(shell: ShellVm, error: Option<ViewError>, on_action: Callback<UiAction>) -> Element {
    let theme_label = match shell.theme {
        Theme::Dark => "Light mode",
        Theme::Light => "Dark mode",
    };

    rsx! {
        div { class: "{shell.theme_class()}",
            header { class: "app-header",
                div { class: "nav-history",
                    button {
                        class: "btn-icon",
                        r#type: "button",
                        title: "Back",
                        disabled: !shell.can_go_back,
                        onclick: move |_| on_action.call(UiAction::Back),
                        "\u{2190}"
                    }
                    button {
                        class: "btn-icon",
                        r#type: "button",
                        title: "Forward",
                        disabled: !shell.can_go_forward,
                        onclick: move |_| on_action.call(UiAction::Forward),
                        "\u{2192}"
                    }
                }
                h1 { class: "app-title", "Exam Practice" }
                nav { class: "app-nav",
                    button {
                        class: "btn-link",
                        r#type: "button",
                        onclick: move |_| on_action.call(UiAction::Home),
                        "Home"
                    }
                    button {
                        class: "btn-link",
                        r#type: "button",
                        onclick: move |_| on_action.call(UiAction::History),
                        "History"
                    }
                    if shell.has_mode_step {
                        button {
                            class: "btn-link",
                            r#type: "button",
                            onclick: move |_| on_action.call(UiAction::Contact),
                            "Contact"
                        }
                    }
                    button {
                        id: "theme-toggle",
                        class: "btn-link",
                        r#type: "button",
                        onclick: move |_| on_action.call(UiAction::ToggleTheme),
                        "{theme_label}"
                    }
                }
            }

            if let Some(notice) = shell.notice.clone() {
                NoticeBanner { notice, on_action }
            }
            if let Some(err) = error {
                div { class: "alert", role: "alert", "{err.message()}" }
            }

            main { class: "panel", "data-step": "{shell.step}",
                Panel { shell: shell.clone(), on_action }
            }
        }
    }
}

#[component]
fn NoticeBanner(notice: NoticeVm, on_action: Callback<UiAction>) -> Element {
    rsx! {
        div { class: if notice.warning { "notice notice--warning" } else { "notice" },
            span { "{notice.text}" }
            button {
                class: "btn-icon",
                r#type: "button",
                title: "Dismiss",
                onclick: move |_| on_action.call(UiAction::DismissNotice),
                "\u{00d7}"
            }
        }
    }
}

#[component]
fn Panel(shell: ShellVm, on_action: Callback<UiAction>) -> Element {
    let selection = shell.selection;
    match shell.step {
        Step::Home => rsx! { HomePanel { on_action } },
        Step::Subject => rsx! { SubjectPanel { choices: selection.subjects, on_action } },
        Step::Type => rsx! {
            TypePanel { summary: selection.summary, choices: selection.exam_types, on_action }
        },
        Step::Year => rsx! {
            YearPanel { summary: selection.summary, years: selection.years, on_action }
        },
        Step::Mode => rsx! {
            ModePanel { summary: selection.summary, modes: selection.modes, on_action }
        },
        Step::Exam => match shell.exam {
            Some(exam) => rsx! { ExamPanel { exam, on_action } },
            None => rsx! {
                p { class: "empty", "No exam is in progress." }
            },
        },
        Step::Results => match shell.results {
            Some(results) => rsx! { ResultsPanel { results, on_action } },
            None => rsx! {
                p { class: "empty", "No results to show yet." }
            },
        },
        Step::History => rsx! { HistoryPanel { cards: shell.history, on_action } },
        Step::Contact => rsx! { ContactPanel {} },
    }
}
