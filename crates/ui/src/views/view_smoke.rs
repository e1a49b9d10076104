use chrono::Duration;
use exam_core::model::ExamMode;
use exam_core::navigation::Flow;
use storage::ResultRepository;

use super::test_harness::{MemorySource, TWO_QUESTIONS, ViewHarness, drive_async, render_frame};
use crate::context::UiAction;
use crate::vm::EMPTY_HISTORY_MESSAGE;

const MOCK_2024: &str = "exams/physics/mock/2024.json";

fn harness(query: &str) -> ViewHarness {
    ViewHarness::new(
        MemorySource::default().with(MOCK_2024, TWO_QUESTIONS),
        Flow::Timed,
        query,
    )
}

async fn open_year_panel(harness: &ViewHarness) {
    harness.ctx.resume().await;
    harness.ctx.dispatch(UiAction::Start).await;
    harness.ctx.dispatch(UiAction::Subject("physics".into())).await;
    harness.ctx.dispatch(UiAction::ExamType("mock".into())).await;
}

async fn open_exam(harness: &ViewHarness, mode: ExamMode) {
    open_year_panel(harness).await;
    harness.ctx.dispatch(UiAction::Year("2024".into())).await;
    let frame = harness.ctx.dispatch(UiAction::Mode(mode)).await;
    assert_eq!(frame.error, None);
}

#[tokio::test(flavor = "current_thread")]
async fn shell_mounts_on_home() {
    let harness = harness("");
    let dom = harness.mount().await;
    let html = dioxus_ssr::render(&dom);
    assert!(html.contains("Start practicing"), "missing home cta in {html}");
    assert!(html.contains("theme-dark"), "missing default theme in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_deep_link_shows_empty_message() {
    let harness = harness("?step=history");
    let mut dom = harness.mount().await;
    drive_async(&mut dom).await;
    let html = dioxus_ssr::render(&dom);
    assert!(html.contains(EMPTY_HISTORY_MESSAGE), "missing empty text in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn year_panel_marks_unavailable_years() {
    let harness = harness("");
    open_year_panel(&harness).await;
    let frame = harness.ctx.dispatch(UiAction::DismissNotice).await;
    let html = render_frame(frame);
    assert!(html.contains("Physics / Mock"), "missing breadcrumb in {html}");
    assert!(html.contains("(available)"), "missing available badge in {html}");
    assert!(html.contains("(not available)"), "missing unavailable badge in {html}");
    assert!(html.contains("unavailable"), "missing unavailable class in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn unavailable_year_raises_alert() {
    let harness = harness("");
    open_year_panel(&harness).await;
    let frame = harness.ctx.dispatch(UiAction::Year("2019".into())).await;
    let html = render_frame(frame);
    assert!(
        html.contains("The exam for 2019 is not available. Please select an available exam."),
        "missing alert in {html}"
    );
    assert!(html.contains("Choose a year"), "should stay on year panel: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn full_exam_renders_timer_and_dims_when_paused() {
    let harness = harness("");
    open_exam(&harness, ExamMode::Full).await;

    let html = render_frame(harness.ctx.dispatch(UiAction::DismissNotice).await);
    assert!(html.contains("PHYSICS MOCK - 2024"), "missing title in {html}");
    assert!(html.contains("1:00:00"), "missing full timer in {html}");
    assert!(html.contains("<em>both</em>"), "passage markup lost in {html}");
    assert!(html.contains("H<sub>2</sub>O"), "question markup lost in {html}");
    assert!(html.contains("figs/sum.png"), "missing image in {html}");
    assert!(html.contains("Submit exam"), "missing submit in {html}");

    harness.clock.clone().advance(Duration::seconds(61));
    let ticked = harness.ctx.tick().await.expect("exam panel ticks");
    assert!(render_frame(ticked).contains("58:59"));

    let paused = render_frame(harness.ctx.dispatch(UiAction::TogglePause).await);
    assert!(paused.contains("question-list--paused"), "not dimmed: {paused}");
    assert!(paused.contains("Resume"), "missing resume in {paused}");
}

#[tokio::test(flavor = "current_thread")]
async fn question_by_question_marks_wrong_pick() {
    let harness = harness("");
    open_exam(&harness, ExamMode::QuestionByQuestion).await;

    let frame = harness
        .ctx
        .dispatch(UiAction::Answer {
            question: 0,
            option: 1,
        })
        .await;
    let html = render_frame(frame);
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("option--wrong"), "missing wrong mark in {html}");
    assert!(html.contains("option--correct"), "missing correct mark in {html}");
    assert!(!html.contains("timer-remaining"), "qbq has no timer: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_and_history_after_submit() {
    let harness = harness("");
    open_exam(&harness, ExamMode::Full).await;
    harness
        .ctx
        .dispatch(UiAction::Answer {
            question: 0,
            option: 0,
        })
        .await;
    harness.clock.clone().advance(Duration::minutes(3));

    let results = render_frame(harness.ctx.dispatch(UiAction::Submit).await);
    assert!(results.contains("1 / 2"), "missing raw score in {results}");
    assert!(results.contains("50%"), "missing percentage in {results}");
    assert!(results.contains("Review your answers below."), "missing comment in {results}");
    assert!(results.contains("No answer"), "missing unanswered marker in {results}");
    assert!(results.contains("Correct answer:"), "missing key in {results}");
    assert!(results.contains("Time: 3:00"), "missing time in {results}");

    let stored = harness.storage.results.load_index().await.expect("index");
    assert_eq!(stored.len(), 1);

    let history = render_frame(harness.ctx.dispatch(UiAction::History).await);
    assert!(history.contains("PHYSICS MOCK - 2024"), "missing card title in {history}");
    assert!(history.contains("Best Score:"), "missing stat in {history}");
    assert!(!history.contains("Last Score:"), "single attempt shows no last score: {history}");
}

#[tokio::test(flavor = "current_thread")]
async fn theme_toggle_switches_class() {
    let harness = harness("");
    harness.ctx.resume().await;
    let html = render_frame(harness.ctx.dispatch(UiAction::ToggleTheme).await);
    assert!(html.contains("theme-light"), "theme not toggled in {html}");
    assert!(html.contains("Dark mode"), "toggle label not flipped in {html}");
}
