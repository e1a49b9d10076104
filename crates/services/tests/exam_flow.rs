use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use exam_core::Clock;
use exam_core::model::{ExamKey, ExamMode};
use exam_core::navigation::{Flow, Step};
use exam_core::time::fixed_now;
use services::{AppError, AppServices, DirExamSource, ExamApp, Notice, ServiceOptions};
use storage::Storage;

const TWO_QUESTIONS: &str = r#"{
    "passage": "Read carefully.",
    "questions": [
        {"q": "2 + 2?", "options": ["4", "5"], "correct": 0},
        {"q": "Capital of France?", "options": ["Rome", "Paris"], "correct": 1, "images": ["a.png", "b.png"]}
    ]
}"#;

struct ExamTree {
    root: PathBuf,
}

impl ExamTree {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("exam-flow-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn add(&self, subject: &str, exam_type: &str, year: &str, body: &str) {
        let dir = self.root.join("exams").join(subject).join(exam_type);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{year}.json")), body).unwrap();
    }

    fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for ExamTree {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn build(tree: &ExamTree, storage: &Storage, clock: Clock, flow: Flow) -> ExamApp {
    let options = ServiceOptions {
        flow,
        ..ServiceOptions::default()
    };
    let source = Arc::new(DirExamSource::new(tree.path()));
    ExamApp::new(AppServices::from_storage(storage, source, options, clock))
}

async fn reach_mode_panel(app: &mut ExamApp) {
    app.start().unwrap();
    app.select_subject("physics").await.unwrap();
    app.select_type("mock").await.unwrap();
    app.select_year("2024").await.unwrap();
}

#[tokio::test]
async fn repeated_full_attempts_track_bests_and_history() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let clock = Clock::manual(fixed_now());
    let mut app = build(&tree, &storage, clock.clone(), Flow::Timed);

    reach_mode_panel(&mut app).await;
    assert_eq!(app.step(), Step::Mode);
    let listed: Vec<_> = app.years().iter().filter(|y| y.available).collect();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].year, "2024");

    app.select_mode(ExamMode::Full).await.unwrap();
    assert_eq!(app.step(), Step::Exam);
    app.answer(0, 0).await.unwrap();
    app.answer(1, 0).await.unwrap();
    clock.clone().advance(Duration::minutes(12));
    app.submit().await.unwrap();

    let first = app.outcome().unwrap();
    assert_eq!(first.raw_score(), "1 / 2");
    assert_eq!(first.result.percentage, 50);
    assert_eq!(first.result.attempts, 1);
    assert_eq!(first.result.best_score, 1);

    app.try_another_year().await.unwrap();
    let badge = app.years().iter().find(|y| y.year == "2024").unwrap();
    assert_eq!(badge.best_percentage, Some(50));

    app.select_year("2024").await.unwrap();
    app.select_mode(ExamMode::Full).await.unwrap();
    app.answer(0, 0).await.unwrap();
    app.answer(1, 1).await.unwrap();
    clock.clone().advance(Duration::minutes(20));
    app.submit().await.unwrap();

    let second = app.outcome().unwrap();
    assert_eq!(second.result.score, 2);
    assert_eq!(second.result.percentage, 100);
    assert_eq!(second.result.attempts, 2);
    assert_eq!(second.result.best_score, 2);
    assert_eq!(second.result.best_percentage, 100);
    // Slower second attempt keeps the faster best time.
    assert_eq!(second.result.time_taken, Some(20 * 60));
    assert_eq!(second.result.best_time, Some(12 * 60));

    app.show_history().await.unwrap();
    let once = app.history().to_vec();
    app.go_home().await.unwrap();
    app.show_history().await.unwrap();
    assert_eq!(app.history(), once.as_slice());
    assert_eq!(once.len(), 1);
}

#[tokio::test]
async fn timeout_submits_with_unanswered_questions_wrong() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let clock = Clock::manual(fixed_now());
    let mut app = build(&tree, &storage, clock.clone(), Flow::Timed);

    reach_mode_panel(&mut app).await;
    app.select_mode(ExamMode::Full).await.unwrap();

    clock.clone().advance(Duration::minutes(56));
    app.tick().await.unwrap();
    assert!(matches!(app.take_notice(), Some(Notice::Warning(_))));

    clock.clone().advance(Duration::minutes(5));
    app.tick().await.unwrap();
    assert_eq!(app.step(), Step::Results);
    assert!(matches!(app.take_notice(), Some(Notice::Info(_))));

    let outcome = app.outcome().unwrap();
    assert!(outcome.timed_out);
    assert_eq!(outcome.result.score, 0);
    assert_eq!(outcome.result.time_taken, Some(60 * 60));
    assert!(outcome.card.reviews.iter().all(|r| r.selected.is_none()));

    let key = ExamKey::new("physics", "mock", "2024").unwrap();
    assert!(storage.exam_states.load_state(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn reload_mid_exam_restores_answers_and_clock() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let clock = Clock::manual(fixed_now());

    let mut first = build(&tree, &storage, clock.clone(), Flow::Timed);
    reach_mode_panel(&mut first).await;
    first.select_mode(ExamMode::Full).await.unwrap();
    first.answer(1, 1).await.unwrap();
    clock.clone().advance(Duration::seconds(90));
    first.tick().await.unwrap();
    drop(first);

    clock.clone().advance(Duration::minutes(10));
    let mut reloaded = build(&tree, &storage, clock.clone(), Flow::Timed);
    assert_eq!(reloaded.resume("?step=exam").await.unwrap(), Step::Exam);
    let attempt = reloaded.attempt().unwrap();
    assert_eq!(attempt.answer(1), Some(1));
    assert_eq!(attempt.answer(0), None);

    let tick = reloaded.tick().await.unwrap().unwrap();
    assert_eq!(tick.elapsed_secs, 90 + 600);
}

#[tokio::test]
async fn year_that_disappears_cannot_be_loaded() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let mut app = build(&tree, &storage, Clock::manual(fixed_now()), Flow::Timed);

    reach_mode_panel(&mut app).await;
    std::fs::remove_dir_all(tree.path().join("exams")).unwrap();

    let err = app.select_mode(ExamMode::Full).await.unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
    assert_eq!(app.step(), Step::Mode);
    assert!(app.attempt().is_none());
}

#[tokio::test]
async fn question_by_question_walks_to_results() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let mut app = build(&tree, &storage, Clock::manual(fixed_now()), Flow::Timed);

    reach_mode_panel(&mut app).await;
    app.select_mode(ExamMode::QuestionByQuestion).await.unwrap();

    let feedback = app.answer(0, 1).await.unwrap().unwrap();
    assert!(!feedback.is_correct());
    assert!(app.answer(0, 0).await.is_err());
    assert_eq!(app.next_question().await.unwrap(), Step::Exam);
    app.answer(1, 1).await.unwrap();
    assert_eq!(app.next_question().await.unwrap(), Step::Results);

    // Observed scoring rule for immediate-feedback mode: every question counts.
    let outcome = app.outcome().unwrap();
    assert_eq!(outcome.result.score, 2);
    assert_eq!(outcome.result.best_time, None);
}

#[tokio::test]
async fn classic_flow_loads_on_year_selection() {
    let tree = ExamTree::new();
    tree.add("biology", "final", "2020", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let mut app = build(&tree, &storage, Clock::manual(fixed_now()), Flow::Classic);

    app.start().unwrap();
    app.select_subject("biology").await.unwrap();
    app.select_type("final").await.unwrap();
    assert_eq!(app.select_year("2020").await.unwrap(), Step::Exam);
    assert!(app.timer_status().is_none());
    assert!(app.toggle_pause().await.is_err());

    app.answer(1, 1).await.unwrap();
    app.submit().await.unwrap();
    assert_eq!(app.outcome().unwrap().result.score, 1);
    assert_eq!(app.outcome().unwrap().result.mode, None);

    assert_eq!(app.back().await.unwrap(), Some(Step::Exam));
    assert_eq!(app.forward().await.unwrap(), Some(Step::Results));
}

#[tokio::test]
async fn back_to_home_abandons_running_exam() {
    let tree = ExamTree::new();
    tree.add("physics", "mock", "2024", TWO_QUESTIONS);
    let storage = Storage::in_memory();
    let clock = Clock::manual(fixed_now());
    let mut app = build(&tree, &storage, clock.clone(), Flow::Timed);

    reach_mode_panel(&mut app).await;
    app.select_mode(ExamMode::Full).await.unwrap();
    app.answer(0, 0).await.unwrap();
    clock.clone().advance(Duration::minutes(5));

    while app.step() != Step::Home {
        assert!(app.back().await.unwrap().is_some());
    }

    let key = ExamKey::new("physics", "mock", "2024").unwrap();
    assert!(app.session().is_empty());
    assert!(app.attempt().is_none());
    assert!(app.exam().is_none());
    assert!(app.years().is_empty());
    assert!(storage.exam_states.load_state(&key).await.unwrap().is_none());
    assert!(storage.sessions.load_session().await.unwrap().is_none());

    reach_mode_panel(&mut app).await;
    app.select_mode(ExamMode::Full).await.unwrap();
    assert_eq!(app.attempt().unwrap().answer(0), None);
    assert_eq!(app.timer_status().unwrap().remaining_secs, 60 * 60);
}
